use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::PrimitiveDateTime;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) email: String,
    pub(crate) phone: String,
    pub(crate) section: String,
    pub(crate) class_name: String,
    pub(crate) is_verified: bool,
    pub(crate) role: String,
    pub(crate) password: String,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Teacher {
    pub(crate) id: String,
    pub(crate) profile_info: String,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Student {
    pub(crate) id: String,
    pub(crate) profile_info: String,
    pub(crate) attempted_tests: Json<Vec<String>>,
    pub(crate) test_status: Json<Vec<serde_json::Value>>,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Test {
    pub(crate) id: String,
    pub(crate) teacher_id: String,
    pub(crate) test_name: String,
    pub(crate) category: String,
    pub(crate) class_name: String,
    pub(crate) minutes: i32,
    pub(crate) rules: String,
    pub(crate) out_of_marks: f64,
    pub(crate) questions: Json<Vec<serde_json::Value>>,
    /// Sorted and duplicate-free; only ever written through a set union.
    pub(crate) assigned_to: Vec<String>,
    pub(crate) attempted: bool,
    pub(crate) answers: Json<Vec<serde_json::Value>>,
    pub(crate) submit_by: Json<Vec<String>>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// Row shape of `tests` as listed on a teacher's dashboard.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct TestSummary {
    pub(crate) id: String,
    pub(crate) submit_by: Json<Vec<String>>,
    pub(crate) class_name: String,
    pub(crate) test_name: String,
}

/// A teacher row joined with the user its `profile_info` points at.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct TeacherWithUser {
    #[sqlx(rename = "teacher_id")]
    pub(crate) id: String,
    #[sqlx(rename = "teacher_created_at")]
    pub(crate) created_at: PrimitiveDateTime,
    #[sqlx(flatten)]
    pub(crate) user: User,
}
