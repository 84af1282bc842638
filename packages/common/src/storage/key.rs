use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::StorageError;

/// Longest filename, in bytes, a [`BlobKey`] accepts.
pub const MAX_FILENAME_LEN: usize = 255;

/// Top-level directory a blob lives under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    Posts,
    Users,
}

impl Namespace {
    pub const ALL: [Namespace; 2] = [Namespace::Posts, Namespace::Users];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Posts => "posts",
            Self::Users => "users",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Namespace {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "posts" => Ok(Self::Posts),
            "users" => Ok(Self::Users),
            other => Err(StorageError::InvalidKey(format!(
                "unknown namespace '{other}'"
            ))),
        }
    }
}

/// Address of a blob: a namespace plus a flat filename.
///
/// The filename is validated on construction so a key can never escape its
/// namespace directory.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BlobKey {
    namespace: Namespace,
    filename: String,
}

impl BlobKey {
    pub fn new(namespace: Namespace, filename: impl Into<String>) -> Result<Self, StorageError> {
        let filename = filename.into();
        validate_flat_filename(&filename)?;
        Ok(Self {
            namespace,
            filename,
        })
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Relative path in `{namespace}/{filename}` form.
    pub fn path(&self) -> String {
        format!("{}/{}", self.namespace, self.filename)
    }
}

impl fmt::Display for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.filename)
    }
}

fn validate_flat_filename(filename: &str) -> Result<(), StorageError> {
    let invalid = |reason: &str| Err(StorageError::InvalidKey(format!("{reason}: {filename:?}")));

    if filename.trim().is_empty() {
        return invalid("filename cannot be empty");
    }
    if filename.len() > MAX_FILENAME_LEN {
        return invalid("filename is too long");
    }
    // Control characters also covers NUL.
    if filename.chars().any(|c| c.is_control()) {
        return invalid("filename contains control characters");
    }
    if filename.contains('/') || filename.contains('\\') {
        return invalid("filename contains a path separator");
    }
    if filename.starts_with('.') {
        return invalid("filename must not start with '.'");
    }
    Ok(())
}
