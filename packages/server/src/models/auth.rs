use serde::Serialize;

use crate::models::user::UserResponse;
use crate::validation::{FieldRules, Rule};

pub const LOGIN_RULES: &[FieldRules] = &[
    FieldRules::new("email", &[Rule::Required, Rule::Email]),
    FieldRules::new("password", &[Rule::Required, Rule::String]),
];

/// Request body for user login.
#[derive(utoipa::ToSchema)]
#[allow(dead_code)]
pub struct LoginForm {
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

/// Successful login response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    /// JWT bearer token.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    #[schema(example = "Bearer")]
    pub token_type: &'static str,
    pub user: UserResponse,
}
