//! Declarative field validation for write requests.
//!
//! Each operation declares a list of [`FieldRules`]; [`validate`] checks a
//! [`FormData`] against it and collects every failure per field.

pub mod image;

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::extractors::form::FormData;
pub use image::ImageKind;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
        .unwrap_or_else(|e| panic!("email regex failed to compile: {e}"))
});

/// A single constraint on a field.
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    Required,
    String,
    /// At most `n` characters.
    Max(usize),
    /// At least `n` characters.
    Min(usize),
    Email,
    /// An uploaded image whose detected type is one of `mimes` and whose
    /// size is at most `max_kb` kilobytes.
    Image {
        mimes: &'static [&'static str],
        max_kb: u64,
    },
}

/// The rules applied to one field.
#[derive(Debug, Clone, Copy)]
pub struct FieldRules {
    pub field: &'static str,
    pub rules: &'static [Rule],
}

impl FieldRules {
    pub const fn new(field: &'static str, rules: &'static [Rule]) -> Self {
        Self { field, rules }
    }

    fn is_required(&self) -> bool {
        self.rules.iter().any(|r| matches!(r, Rule::Required))
    }

    fn is_file(&self) -> bool {
        self.rules.iter().any(|r| matches!(r, Rule::Image { .. }))
    }
}

/// Field name mapped to its failure messages, serialized as a bare object.
#[derive(Debug, Default, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(transparent)]
#[schema(example = json!({"name": ["The name field is required."]}))]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Names of the failing fields, in order. Safe to log: no input values.
    pub fn fields(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    /// `Ok` when no field failed.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// Human-readable attribute name: `nomor_induk` becomes `nomor induk`.
fn attribute(field: &str) -> String {
    field.replace('_', " ")
}

/// Check `form` against `rules`, collecting every failure.
///
/// Absent optional fields are skipped entirely. A missing required field
/// reports only the `required` failure.
pub fn validate(form: &FormData, rules: &[FieldRules]) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    for field_rules in rules {
        check_field(form, field_rules, &mut errors);
    }
    errors.into_result()
}

fn check_field(form: &FormData, field_rules: &FieldRules, errors: &mut FieldErrors) {
    let field = field_rules.field;
    let attr = attribute(field);

    if !form.has(field) {
        if field_rules.is_required() {
            errors.add(field, format!("The {attr} field is required."));
        }
        return;
    }

    if field_rules.is_file() {
        check_file(form, field_rules, &attr, errors);
        return;
    }

    let Some(text) = form.text(field) else {
        // Arrays, objects, or a file sent where text was expected.
        errors.add(field, format!("The {attr} field must be a string."));
        return;
    };
    let len = text.chars().count();

    for rule in field_rules.rules {
        match *rule {
            Rule::Required | Rule::String | Rule::Image { .. } => {}
            Rule::Max(n) if len > n => errors.add(
                field,
                format!("The {attr} field must not be greater than {n} characters."),
            ),
            Rule::Min(n) if len < n => errors.add(
                field,
                format!("The {attr} field must be at least {n} characters."),
            ),
            Rule::Email if !EMAIL_RE.is_match(&text) => errors.add(
                field,
                format!("The {attr} field must be a valid email address."),
            ),
            _ => {}
        }
    }
}

fn check_file(form: &FormData, field_rules: &FieldRules, attr: &str, errors: &mut FieldErrors) {
    let field = field_rules.field;
    let Some(file) = form.file(field) else {
        errors.add(field, format!("The {attr} field must be an image."));
        return;
    };

    for rule in field_rules.rules {
        let Rule::Image { mimes, max_kb } = *rule else {
            continue;
        };

        match ImageKind::sniff(&file.bytes) {
            None => errors.add(field, format!("The {attr} field must be an image.")),
            Some(kind) if !mimes.iter().any(|m| kind.matches(m)) => errors.add(
                field,
                format!("The {attr} field must be a file of type: {}.", mimes.join(", ")),
            ),
            Some(_) => {}
        }

        if file.bytes.len() as u64 > max_kb * 1024 {
            errors.add(
                field,
                format!("The {attr} field must not be greater than {max_kb} kilobytes."),
            );
        }
    }
}
