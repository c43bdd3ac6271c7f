use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};

use crate::db::models::Student;

const COLUMNS: &str = "id, profile_info, attempted_tests, test_status, created_at";

#[cfg(test)]
pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!("SELECT {COLUMNS} FROM students WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_by_user_id(
    pool: &PgPool,
    user_id: &str,
) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "SELECT {COLUMNS} FROM students WHERE profile_info = $1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn lock_by_id(
    executor: impl PgExecutor<'_>,
    id: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT id FROM students WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Adds `test_id` to `attempted_tests` (once) and appends `status` to `test_status`.
/// Attempts and submissions both go through here, so a submitted test always
/// counts as attempted.
pub(crate) async fn record_progress(
    executor: impl PgExecutor<'_>,
    student_id: &str,
    test_id: &str,
    status: serde_json::Value,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE students SET
            attempted_tests = CASE
                WHEN attempted_tests @> jsonb_build_array($2::text) THEN attempted_tests
                ELSE attempted_tests || jsonb_build_array($2::text)
            END,
            test_status = test_status || jsonb_build_array($3::jsonb)
         WHERE id = $1",
    )
    .bind(student_id)
    .bind(test_id)
    .bind(Json(status))
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

#[cfg(test)]
pub(crate) async fn create(
    pool: &PgPool,
    id: &str,
    user_id: &str,
    created_at: time::PrimitiveDateTime,
) -> Result<Student, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "INSERT INTO students (id, profile_info, created_at) VALUES ($1, $2, $3)
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(user_id)
    .bind(created_at)
    .fetch_one(pool)
    .await
}
