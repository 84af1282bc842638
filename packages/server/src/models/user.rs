use chrono::{DateTime, Utc};
use common::storage::Namespace;
use serde::Serialize;

use crate::entity::user;
use crate::extractors::form::FormData;
use crate::models::shared::image_url;
use crate::validation::{FieldRules, Rule};

const USER_IMAGE: Rule = Rule::Image {
    mimes: &["jpeg", "png", "jpg", "svg"],
    max_kb: 2048,
};

pub const USER_CREATE_RULES: &[FieldRules] = &[
    FieldRules::new("nomor_induk", &[Rule::Required, Rule::Max(30)]),
    FieldRules::new("fullname", &[Rule::Required, Rule::String, Rule::Max(255)]),
    FieldRules::new("username", &[Rule::Required, Rule::String, Rule::Max(255)]),
    FieldRules::new("password", &[Rule::Required, Rule::String, Rule::Min(8)]),
    FieldRules::new("email", &[Rule::Required, Rule::Email, Rule::Max(200)]),
    FieldRules::new("image", &[USER_IMAGE]),
    FieldRules::new("phone", &[Rule::Min(11), Rule::Max(20)]),
];

/// Same as create, except the password may be omitted to keep the current one.
pub const USER_UPDATE_RULES: &[FieldRules] = &[
    FieldRules::new("nomor_induk", &[Rule::Required, Rule::Max(30)]),
    FieldRules::new("fullname", &[Rule::Required, Rule::String, Rule::Max(255)]),
    FieldRules::new("username", &[Rule::Required, Rule::String, Rule::Max(255)]),
    FieldRules::new("password", &[Rule::String, Rule::Min(8)]),
    FieldRules::new("email", &[Rule::Required, Rule::Email, Rule::Max(200)]),
    FieldRules::new("image", &[USER_IMAGE]),
    FieldRules::new("phone", &[Rule::Min(11), Rule::Max(20)]),
];

#[derive(utoipa::ToSchema)]
#[allow(dead_code)]
pub struct UserForm {
    /// Student or employee number, at most 30 characters.
    #[schema(example = "1201200123")]
    pub nomor_induk: String,
    #[schema(example = "Alice Wonder")]
    pub fullname: String,
    #[schema(example = "alice")]
    pub username: String,
    /// At least 8 characters. Required on create, optional on update.
    #[schema(example = "s3cure_P@ss!")]
    pub password: Option<String>,
    /// Unique across users.
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// jpeg, png, jpg or svg; at most 2048 KB.
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<Vec<u8>>,
    /// 11-20 characters.
    #[schema(example = "081234567890")]
    pub phone: Option<String>,
}

/// Validated text fields of a user write. `password` is plaintext here and
/// must be hashed before it reaches the database.
pub struct UserInput {
    pub nomor_induk: String,
    pub fullname: String,
    pub username: String,
    pub email: String,
    pub password: Option<String>,
    pub phone: Option<String>,
}

impl UserInput {
    pub fn from_form(form: &FormData) -> Self {
        Self {
            nomor_induk: form.text("nomor_induk").unwrap_or_default(),
            fullname: form.text("fullname").unwrap_or_default(),
            username: form.text("username").unwrap_or_default(),
            email: form.text("email").unwrap_or_default(),
            password: form.text("password"),
            phone: form.text("phone"),
        }
    }
}

impl std::fmt::Debug for UserInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserInput")
            .field("nomor_induk", &self.nomor_induk)
            .field("fullname", &self.fullname)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("phone", &self.phone)
            .finish()
    }
}

/// A user as returned by the API. The password hash is never included.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "1201200123")]
    pub nomor_induk: String,
    #[schema(example = "Alice Wonder")]
    pub fullname: String,
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "alice-1700000000.png")]
    pub image: Option<String>,
    #[schema(example = "/storage/users/alice-1700000000.png")]
    pub image_url: Option<String>,
    #[schema(example = "081234567890")]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            nomor_induk: m.nomor_induk,
            fullname: m.fullname,
            username: m.username,
            email: m.email,
            image_url: image_url(Namespace::Users.as_str(), m.image.as_deref()),
            image: m.image,
            phone: m.phone,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
