use sqlx::PgPool;
use uuid::Uuid;

use crate::models::refresh_session::RefreshSession;

const SELECT_COLUMNS: &str = "id, user_id, refresh_token, expires_in, created_at";

pub async fn insert_refresh_session(
    pool: &PgPool,
    user_id: Uuid,
    refresh_token: Uuid,
    expires_in: i64,
) -> Result<RefreshSession, sqlx::Error> {
    let query = format!(
        "INSERT INTO refresh_sessions (user_id, refresh_token, expires_in) \
         VALUES ($1, $2, $3) RETURNING {}",
        SELECT_COLUMNS
    );
    sqlx::query_as::<_, RefreshSession>(&query)
        .bind(user_id)
        .bind(refresh_token)
        .bind(expires_in)
        .fetch_one(pool)
        .await
}

pub async fn find_session_by_token(
    pool: &PgPool,
    refresh_token: Uuid,
) -> Result<Option<RefreshSession>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM refresh_sessions WHERE refresh_token = $1",
        SELECT_COLUMNS
    );
    sqlx::query_as::<_, RefreshSession>(&query)
        .bind(refresh_token)
        .fetch_optional(pool)
        .await
}

pub async fn delete_session_by_id(pool: &PgPool, session_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM refresh_sessions WHERE id = $1")
        .bind(session_id)
        .execute(pool)
        .await
        .map(|_| ())
}

/// Idempotent: deleting an absent token is a no-op.
pub async fn delete_session_by_token(
    pool: &PgPool,
    refresh_token: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM refresh_sessions WHERE refresh_token = $1")
        .bind(refresh_token)
        .execute(pool)
        .await
        .map(|_| ())
}

/// Sign-out-everywhere: drops every session the user holds.
pub async fn delete_sessions_for_user(pool: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM refresh_sessions WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
