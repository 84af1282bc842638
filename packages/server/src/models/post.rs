use chrono::{DateTime, Utc};
use common::storage::Namespace;
use serde::Serialize;

use crate::entity::post;
use crate::extractors::form::FormData;
use crate::models::shared::image_url;
use crate::validation::{FieldRules, Rule};

pub const POST_RULES: &[FieldRules] = &[
    FieldRules::new("title", &[Rule::Required]),
    FieldRules::new("description", &[Rule::Required]),
    FieldRules::new(
        "image",
        &[Rule::Image {
            mimes: &["jpeg", "png", "jpg", "gif", "svg"],
            max_kb: 2048,
        }],
    ),
    FieldRules::new("status", &[Rule::Required]),
];

/// Form fields accepted by create and update.
#[derive(utoipa::ToSchema)]
#[allow(dead_code)]
pub struct PostForm {
    #[schema(example = "Berita Hari Ini")]
    pub title: String,
    #[schema(example = "Isi berita lengkap.")]
    pub description: String,
    /// jpeg, png, jpg, gif or svg; at most 2048 KB.
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<Vec<u8>>,
    /// Free-form status label.
    #[schema(example = "published")]
    pub status: String,
}

/// Validated text fields of a post write.
#[derive(Debug)]
pub struct PostInput {
    pub title: String,
    pub description: String,
    pub status: String,
}

impl PostInput {
    /// Read the fields out of an already-validated form.
    pub fn from_form(form: &FormData) -> Self {
        Self {
            title: form.text("title").unwrap_or_default(),
            description: form.text("description").unwrap_or_default(),
            status: form.text("status").unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PostResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Berita Hari Ini")]
    pub title: String,
    #[schema(example = "Isi berita lengkap.")]
    pub description: String,
    /// Stored image filename, if any.
    #[schema(example = "Berita-Hari-Ini-1700000000.png")]
    pub image: Option<String>,
    #[schema(example = "/storage/posts/Berita-Hari-Ini-1700000000.png")]
    pub image_url: Option<String>,
    #[schema(example = "published")]
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<post::Model> for PostResponse {
    fn from(m: post::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            image_url: image_url(Namespace::Posts.as_str(), m.image.as_deref()),
            image: m.image,
            status: m.status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
