use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub nomor_induk: String,
    pub fullname: String,
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password: String,      // Argon2 PHC string
    pub image: Option<String>, // filename under users/
    pub phone: Option<String>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
