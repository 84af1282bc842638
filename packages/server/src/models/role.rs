use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entity::role;
use crate::extractors::form::FormData;
use crate::validation::{FieldRules, Rule};

pub const ROLE_RULES: &[FieldRules] = &[FieldRules::new(
    "name",
    &[Rule::Required, Rule::String, Rule::Max(255)],
)];

#[derive(utoipa::ToSchema)]
#[allow(dead_code)]
pub struct RoleForm {
    /// 1-255 characters.
    #[schema(example = "editor")]
    pub name: String,
}

#[derive(Debug)]
pub struct RoleInput {
    pub name: String,
}

impl RoleInput {
    pub fn from_form(form: &FormData) -> Self {
        Self {
            name: form.text("name").unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RoleResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "editor")]
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<role::Model> for RoleResponse {
    fn from(m: role::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
