//! Subject (`Fach`) records.

use super::ValidationError;
use serde::{Deserialize, Serialize};

/// Primary key of a `Fach` row.
pub type SubjectId = i64;

/// A school course and the teacher who runs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub teacher: Option<String>,
}

/// Writable fields of a subject, shared by add and edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectFields {
    pub name: String,
    pub teacher: Option<String>,
}

impl SubjectFields {
    pub fn new(name: impl Into<String>, teacher: Option<String>) -> Self {
        Self {
            name: name.into(),
            teacher,
        }
    }

    /// Returns the persisted form: trimmed name, blank teacher mapped to `None`.
    ///
    /// # Errors
    /// - [`ValidationError::BlankSubjectName`] when the name is empty after trim.
    pub fn normalized(&self) -> Result<SubjectFields, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::BlankSubjectName);
        }
        let teacher = self
            .teacher
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        Ok(SubjectFields {
            name: name.to_string(),
            teacher,
        })
    }
}
