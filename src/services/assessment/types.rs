use serde::Serialize;
use validator::{Validate, ValidationError};

use crate::db::models::{TeacherWithUser, TestSummary};

/// Everything a teacher supplies when authoring a test. Ids, assignment and
/// attempt tracking are assigned by the service.
#[derive(Debug, Clone, Validate)]
pub(crate) struct NewTest {
    #[validate(length(min = 1, message = "teacher_id must not be empty"))]
    pub(crate) teacher_id: String,
    #[validate(custom(function = "not_blank", message = "test_name must not be empty"))]
    pub(crate) test_name: String,
    #[validate(custom(function = "not_blank", message = "category must not be empty"))]
    pub(crate) category: String,
    #[validate(custom(function = "not_blank", message = "class_name must not be empty"))]
    pub(crate) class_name: String,
    #[validate(range(min = 1, message = "minutes must be positive"))]
    pub(crate) minutes: i32,
    pub(crate) rules: String,
    #[validate(range(exclusive_min = 0.0, message = "out_of_marks must be positive"))]
    pub(crate) out_of_marks: f64,
    #[validate(length(min = 1, message = "questions must not be empty"))]
    pub(crate) questions: Vec<serde_json::Value>,
}

/// Fields a teacher may change on their own profile. Anything else (ids, the
/// `profile_info` link, role) is unreachable through this type.
#[derive(Debug, Clone, Default, Validate)]
pub(crate) struct ProfileChanges {
    #[validate(custom(function = "not_blank", message = "first_name must not be empty"))]
    pub(crate) first_name: Option<String>,
    #[validate(custom(function = "not_blank", message = "last_name must not be empty"))]
    pub(crate) last_name: Option<String>,
    #[validate(email(message = "email is not valid"))]
    pub(crate) email: Option<String>,
    #[validate(custom(function = "not_blank", message = "phone must not be empty"))]
    pub(crate) phone: Option<String>,
    /// Already hashed by the caller.
    pub(crate) password_hash: Option<String>,
}

impl ProfileChanges {
    /// Surrounding whitespace is dropped from every text field before validation.
    pub(crate) fn trimmed(self) -> Self {
        let trim = |value: Option<String>| value.map(|value| value.trim().to_string());
        Self {
            first_name: trim(self.first_name),
            last_name: trim(self.last_name),
            email: trim(self.email),
            phone: trim(self.phone),
            password_hash: self.password_hash,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct TestListing {
    pub(crate) id: String,
    pub(crate) submit_by: Vec<String>,
    pub(crate) class_name: String,
    pub(crate) test_name: String,
}

impl From<TestSummary> for TestListing {
    fn from(row: TestSummary) -> Self {
        Self {
            id: row.id,
            submit_by: row.submit_by.0,
            class_name: row.class_name,
            test_name: row.test_name,
        }
    }
}

pub(crate) type TeacherProfile = TeacherWithUser;

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank"))
    } else {
        Ok(())
    }
}

/// Trims, rejects blanks and drops duplicates while keeping first-seen order.
pub(crate) fn normalize_class_names(raw: &[String]) -> Result<Vec<String>, String> {
    if raw.is_empty() {
        return Err("class names must not be empty".to_string());
    }

    let mut names: Vec<String> = Vec::with_capacity(raw.len());
    for name in raw {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err("class names must not be blank".to_string());
        }
        if !names.iter().any(|existing| existing == trimmed) {
            names.push(trimmed.to_string());
        }
    }

    Ok(names)
}
