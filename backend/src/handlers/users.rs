use axum::{
    extract::{Extension, Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    handlers::auth::clear_cookies,
    models::{
        user::{AdminUpdateUserRequest, UpdateUserRequest, User, UserResponse},
        PaginatedResponse, PaginationQuery,
    },
    repositories::{refresh_session as session_repo, user as user_repo},
    state::AppState,
};

pub async fn me(Extension(user): Extension<User>) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}

/// Self-scope profile update. Privilege flags are not part of the payload
/// and cannot be changed here.
pub async fn update_me(
    State(state): State<AppState>,
    Extension(mut user): Extension<User>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    payload.validate()?;

    apply_profile_changes(
        &mut user,
        payload.email,
        payload.full_name,
        payload.password,
    )?;
    user_repo::update_user(&state.pool, &user).await?;

    Ok(Json(UserResponse::from(user)))
}

/// Soft-deletes the calling account. The row stays (forms keep their
/// creator) but every refresh session is revoked and the auth cookies are
/// cleared.
pub async fn delete_me(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, AppError> {
    user_repo::deactivate_user(&state.pool, user.id).await?;
    session_repo::delete_sessions_for_user(&state.pool, user.id).await?;
    tracing::info!(user_id = %user.id, "user deactivated own account");

    Ok((
        clear_cookies(&state),
        Json(json!({ "message": "Account deactivated" })),
    ))
}

pub async fn admin_list_users(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<UserResponse>>, AppError> {
    let limit = pagination.limit();
    let offset = pagination.offset();
    let users = user_repo::list_users(&state.pool, limit, offset).await?;
    let data = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(PaginatedResponse::new(data, limit, offset)))
}

pub async fn admin_get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    let user = user_repo::find_user_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
    Ok(Json(UserResponse::from(user)))
}

pub async fn admin_update_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<AdminUpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    payload.validate()?;

    let mut user = user_repo::find_user_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

    apply_profile_changes(
        &mut user,
        payload.email,
        payload.full_name,
        payload.password,
    )?;
    if let Some(is_superuser) = payload.is_superuser {
        user.is_superuser = is_superuser;
    }
    if let Some(is_verified) = payload.is_verified {
        user.is_verified = is_verified;
    }
    user_repo::update_user(&state.pool, &user).await?;

    Ok(Json(UserResponse::from(user)))
}

pub async fn admin_delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !user_repo::deactivate_user(&state.pool, user_id).await? {
        return Err(AppError::NotFound(format!("User {} not found", user_id)));
    }
    session_repo::delete_sessions_for_user(&state.pool, user_id).await?;
    tracing::info!(%user_id, "user deactivated by admin");

    Ok(Json(json!({ "message": "Account deactivated" })))
}

fn apply_profile_changes(
    user: &mut User,
    email: Option<String>,
    full_name: Option<String>,
    password: Option<String>,
) -> Result<(), AppError> {
    if let Some(email) = email {
        user.email = email;
    }
    if let Some(full_name) = full_name {
        user.full_name = full_name;
    }
    if let Some(password) = password {
        user.password_hash = crate::utils::password::hash_password(&password)?;
    }
    Ok(())
}
