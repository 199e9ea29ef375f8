use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(FieldErrors),
    #[error("database error: {0}")]
    Db(String),
}

impl From<sea_orm::DbErr> for ModelError {
    fn from(e: sea_orm::DbErr) -> Self { ModelError::Db(e.to_string()) }
}

/// Field-level validation messages, keyed by wire field name.
/// Nested fields use a dotted key (`profile.city`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self { Self::default() }

    pub fn single(field: &str, msg: impl Into<String>) -> Self {
        let mut errs = Self::new();
        errs.add(field, msg);
        errs
    }

    pub fn add(&mut self, field: &str, msg: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(msg.into());
    }

    /// Move `other`'s messages under `prefix.`.
    pub fn nest(&mut self, prefix: &str, other: FieldErrors) {
        for (field, msgs) in other.0 {
            self.0.entry(format!("{prefix}.{field}")).or_default().extend(msgs);
        }
    }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn contains(&self, field: &str) -> bool { self.0.contains_key(field) }

    pub fn get(&self, field: &str) -> Option<&[String]> { self.0.get(field).map(Vec::as_slice) }

    pub fn into_result(self) -> Result<(), ModelError> {
        if self.is_empty() { Ok(()) } else { Err(ModelError::Validation(self)) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, msgs) in &self.0 {
            if !first { f.write_str("; ")?; }
            first = false;
            write!(f, "{}: {}", field, msgs.join(", "))?;
        }
        Ok(())
    }
}
