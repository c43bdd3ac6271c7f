use sqlx::PgPool;

use crate::db::models::TeacherWithUser;

pub(crate) async fn exists(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM teachers WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await
}

/// The `users.id` a teacher profile belongs to.
pub(crate) async fn find_owner(pool: &PgPool, id: &str) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT profile_info FROM teachers WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Loads a teacher and resolves `profile_info` into the referenced user in one query.
pub(crate) async fn find_with_user(
    pool: &PgPool,
    id: &str,
) -> Result<Option<TeacherWithUser>, sqlx::Error> {
    sqlx::query_as::<_, TeacherWithUser>(
        "SELECT t.id AS teacher_id,
                t.created_at AS teacher_created_at,
                u.id, u.first_name, u.last_name, u.email, u.phone, u.section,
                u.class_name, u.is_verified, u.role, u.password, u.created_at
         FROM teachers t
         JOIN users u ON u.id = t.profile_info
         WHERE t.id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

#[cfg(test)]
pub(crate) async fn create(
    pool: &PgPool,
    id: &str,
    user_id: &str,
    created_at: time::PrimitiveDateTime,
) -> Result<crate::db::models::Teacher, sqlx::Error> {
    sqlx::query_as::<_, crate::db::models::Teacher>(
        "INSERT INTO teachers (id, profile_info, created_at) VALUES ($1, $2, $3)
         RETURNING id, profile_info, created_at",
    )
    .bind(id)
    .bind(user_id)
    .bind(created_at)
    .fetch_one(pool)
    .await
}
