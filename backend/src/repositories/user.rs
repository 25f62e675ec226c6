use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::User;

const SELECT_COLUMNS: &str =
    "id, email, password_hash, full_name, is_active, is_superuser, is_verified, registered_at";

pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    let query = format!("SELECT {} FROM users WHERE email = $1", SELECT_COLUMNS);
    sqlx::query_as::<_, User>(&query)
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_user_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
    let query = format!("SELECT {} FROM users WHERE id = $1", SELECT_COLUMNS);
    sqlx::query_as::<_, User>(&query)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn insert_user(pool: &PgPool, user: &User) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO users \
            (id, email, password_hash, full_name, is_active, is_superuser, is_verified, registered_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(user.id)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.full_name)
    .bind(user.is_active)
    .bind(user.is_superuser)
    .bind(user.is_verified)
    .bind(user.registered_at)
    .execute(pool)
    .await
    .map(|_| ())
}

/// Persists the mutable profile columns of an already-loaded user.
pub async fn update_user(pool: &PgPool, user: &User) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE users SET email = $1, full_name = $2, password_hash = $3, \
         is_superuser = $4, is_verified = $5 WHERE id = $6",
    )
    .bind(&user.email)
    .bind(&user.full_name)
    .bind(&user.password_hash)
    .bind(user.is_superuser)
    .bind(user.is_verified)
    .bind(user.id)
    .execute(pool)
    .await
    .map(|_| ())
}

/// Soft delete: the row stays so historical forms and reviews keep their
/// creator reference. Returns false when the user does not exist.
pub async fn deactivate_user(pool: &PgPool, user_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list_users(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<User>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM users ORDER BY registered_at, id LIMIT $1 OFFSET $2",
        SELECT_COLUMNS
    );
    sqlx::query_as::<_, User>(&query)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}
