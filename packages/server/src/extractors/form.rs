use std::collections::HashMap;

use axum::{
    Form, Json,
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::header,
};
use serde_json::{Map, Value};

use crate::error::AppError;

/// Fields whose values are kept verbatim instead of being trimmed.
const UNTRIMMED_FIELDS: &[&str] = &["password", "password_confirmation"];

/// A file part received in a `multipart/form-data` request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Filename as sent by the client.
    pub file_name: Option<String>,
    /// Content type as sent by the client.
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedFile {
    /// Lowercased extension of the client filename, if any.
    pub fn client_extension(&self) -> Option<String> {
        let name = self.file_name.as_deref()?;
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

/// Write-request input accepted as multipart, urlencoded form or JSON.
///
/// String values are trimmed (except passwords) and empty strings are
/// dropped, so "absent", `null` and `""` all read as missing.
#[derive(Debug, Default, Clone)]
pub struct FormData {
    fields: Map<String, Value>,
    files: HashMap<String, UploadedFile>,
}

impl FormData {
    /// Build from a decoded JSON object, normalising every value.
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        let mut form = Self::default();
        for (name, value) in fields {
            form.insert_field(name, value);
        }
        form
    }

    /// Attach a file part. Empty parts (no file chosen) are ignored.
    pub fn with_file(mut self, name: impl Into<String>, file: UploadedFile) -> Self {
        self.insert_file(name.into(), file);
        self
    }

    fn insert_field(&mut self, name: String, value: Value) {
        let value = match value {
            Value::String(s) if UNTRIMMED_FIELDS.contains(&name.as_str()) => Value::String(s),
            Value::String(s) => Value::String(s.trim().to_string()),
            other => other,
        };
        match &value {
            Value::Null => {}
            Value::String(s) if s.is_empty() => {}
            _ => {
                self.fields.insert(name, value);
            }
        }
    }

    fn insert_file(&mut self, name: String, file: UploadedFile) {
        let unnamed = file.file_name.as_deref().is_none_or(|n| n.trim().is_empty());
        if file.bytes.is_empty() && unnamed {
            return;
        }
        self.files.insert(name, file);
    }

    /// Raw value of a non-file field.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Scalar field rendered as text. Numbers and booleans use their JSON
    /// form; arrays and objects yield `None`.
    pub fn text(&self, name: &str) -> Option<String> {
        match self.fields.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name)
    }

    /// Whether the field was supplied at all, as a value or a file.
    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name) || self.files.contains_key(name)
    }

    async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("Multipart error: {e}")))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            let file_name = field.file_name().map(str::to_owned);
            let content_type = field.content_type().map(str::to_owned);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read field '{name}': {e}")))?;

            if file_name.is_some() {
                form.insert_file(
                    name,
                    UploadedFile {
                        file_name,
                        content_type,
                        bytes,
                    },
                );
            } else {
                let text = String::from_utf8(bytes.to_vec()).map_err(|_| {
                    AppError::BadRequest(format!("Field '{name}' is not valid UTF-8"))
                })?;
                form.insert_field(name, Value::String(text));
            }
        }
        Ok(form)
    }
}

impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            return Self::from_multipart(multipart).await;
        }

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            let mut form = Self::default();
            for (name, value) in pairs {
                form.insert_field(name, Value::String(value));
            }
            return Ok(form);
        }

        if content_type.starts_with("application/json") {
            let Json(value) = Json::<Value>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            return match value {
                Value::Object(map) => Ok(Self::from_fields(map)),
                _ => Err(AppError::BadRequest(
                    "Request body must be a JSON object".into(),
                )),
            };
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        if body.is_empty() {
            Ok(Self::default())
        } else {
            Err(AppError::BadRequest(format!(
                "Unsupported content type '{content_type}'"
            )))
        }
    }
}
