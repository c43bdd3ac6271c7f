use sqlx::PgPool;

use crate::db::models::User;

pub(crate) const COLUMNS: &str = "\
    id, first_name, last_name, email, phone, section, class_name, \
    is_verified, role, password, created_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_distinct_class_names(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT DISTINCT class_name FROM users ORDER BY class_name")
        .fetch_all(pool)
        .await
}

#[cfg(test)]
pub(crate) struct CreateUser<'a> {
    pub(crate) id: &'a str,
    pub(crate) first_name: &'a str,
    pub(crate) last_name: &'a str,
    pub(crate) email: &'a str,
    pub(crate) phone: &'a str,
    pub(crate) section: &'a str,
    pub(crate) class_name: &'a str,
    pub(crate) role: &'a str,
    pub(crate) password: String,
    pub(crate) created_at: time::PrimitiveDateTime,
}

#[cfg(test)]
pub(crate) async fn create(pool: &PgPool, params: CreateUser<'_>) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (
            id, first_name, last_name, email, phone, section, class_name,
            is_verified, role, password, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,FALSE,$8,$9,$10)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.first_name)
    .bind(params.last_name)
    .bind(params.email)
    .bind(params.phone)
    .bind(params.section)
    .bind(params.class_name)
    .bind(params.role)
    .bind(params.password)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

/// Allow-listed profile columns. `None` leaves the column untouched.
#[derive(Debug, Default)]
pub(crate) struct UpdateProfile {
    pub(crate) first_name: Option<String>,
    pub(crate) last_name: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) phone: Option<String>,
    pub(crate) password: Option<String>,
}

/// Updates the user behind a teacher profile. Returns the number of rows touched,
/// which is zero when the teacher does not exist.
pub(crate) async fn update_for_teacher(
    pool: &PgPool,
    teacher_id: &str,
    params: UpdateProfile,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE users AS u SET
            first_name = COALESCE($1, u.first_name),
            last_name = COALESCE($2, u.last_name),
            email = COALESCE($3, u.email),
            phone = COALESCE($4, u.phone),
            password = COALESCE($5, u.password)
         FROM teachers AS t
         WHERE t.id = $6 AND u.id = t.profile_info",
    )
    .bind(params.first_name)
    .bind(params.last_name)
    .bind(params.email)
    .bind(params.phone)
    .bind(params.password)
    .bind(teacher_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
