use axum::{
    extract::{Extension, State},
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse},
    Form, Json,
};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::user::{LoginForm, RegisterRequest, TokenResponse, User, UserResponse},
    repositories::{refresh_session as session_repo, user as user_repo},
    state::AppState,
    utils::{
        cookies::{
            build_auth_cookie, build_clear_cookie, extract_cookie_value, ACCESS_COOKIE_NAME,
            ACCESS_COOKIE_PATH, REFRESH_COOKIE_NAME, REFRESH_COOKIE_PATH,
        },
        jwt::{create_access_token, generate_refresh_token},
        password::{hash_password, verify_password},
    },
};

type SetCookies = AppendHeaders<[(header::HeaderName, String); 2]>;

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    payload.validate()?;

    if user_repo::find_user_by_email(&state.pool, &payload.email)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Email is already registered".into()));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = User::new(payload.email, password_hash, payload.full_name);
    user_repo::insert_user(&state.pool, &user).await?;

    tracing::info!(user_id = %user.id, "registered new user");
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// OAuth2 password-flow login: form-encoded `username` (the email) and
/// `password`. On success both auth cookies are set and the access token
/// is also returned in the body for non-browser clients.
pub async fn login(
    State(state): State<AppState>,
    Form(payload): Form<LoginForm>,
) -> Result<(SetCookies, Json<TokenResponse>), AppError> {
    let user = user_repo::find_user_by_email(&state.pool, &payload.username)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }
    if !user.is_active {
        return Err(AppError::Forbidden("Account is deactivated".into()));
    }

    let (cookies, token) = open_session(&state, user.id).await?;
    tracing::debug!(user_id = %user.id, "user logged in");
    Ok((cookies, Json(token)))
}

/// Rotates the refresh session: the presented token is deleted and a new
/// session is issued. A reused (already-rotated) token is invalid.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(SetCookies, Json<TokenResponse>), AppError> {
    let token = refresh_token_from_cookies(&headers).ok_or(AppError::InvalidToken)?;
    let session = session_repo::find_session_by_token(&state.pool, token)
        .await?
        .ok_or(AppError::InvalidToken)?;

    if session.is_expired(Utc::now()) {
        session_repo::delete_session_by_id(&state.pool, session.id).await?;
        return Err(AppError::TokenExpired);
    }

    let user = user_repo::find_user_by_id(&state.pool, session.user_id)
        .await?
        .ok_or(AppError::InvalidToken)?;
    if !user.is_active {
        session_repo::delete_session_by_id(&state.pool, session.id).await?;
        return Err(AppError::Forbidden("Account is deactivated".into()));
    }

    session_repo::delete_session_by_id(&state.pool, session.id).await?;
    let (cookies, token) = open_session(&state, user.id).await?;
    Ok((cookies, Json(token)))
}

/// Revokes the session carried by the refresh cookie and clears both
/// cookies. Succeeds even when the session is already gone.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    if let Some(token) = refresh_token_from_cookies(&headers) {
        session_repo::delete_session_by_token(&state.pool, token).await?;
    }
    Ok((
        clear_cookies(&state),
        Json(json!({ "message": "Logged out" })),
    ))
}

/// Revokes every refresh session of the authenticated user, signing out
/// all devices at once.
pub async fn abort_all_sessions(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, AppError> {
    let revoked = session_repo::delete_sessions_for_user(&state.pool, user.id).await?;
    tracing::info!(user_id = %user.id, revoked, "revoked all refresh sessions");
    Ok((
        clear_cookies(&state),
        Json(json!({ "message": "All sessions revoked", "revoked": revoked })),
    ))
}

async fn open_session(state: &AppState, user_id: Uuid) -> Result<(SetCookies, TokenResponse), AppError> {
    let access_token = create_access_token(
        user_id,
        &state.config.secret_key,
        &state.config.algorithm,
        state.config.access_token_expire_minutes,
    )?;
    let refresh_token = generate_refresh_token();
    session_repo::insert_refresh_session(
        &state.pool,
        user_id,
        refresh_token,
        state.config.refresh_token_max_age_secs() as i64,
    )
    .await?;

    let cookies = AppendHeaders([
        (
            header::SET_COOKIE,
            build_auth_cookie(
                ACCESS_COOKIE_NAME,
                &access_token,
                ACCESS_COOKIE_PATH,
                state.config.access_token_max_age_secs(),
                state.config.cookie_secure,
            ),
        ),
        (
            header::SET_COOKIE,
            build_auth_cookie(
                REFRESH_COOKIE_NAME,
                &refresh_token.to_string(),
                REFRESH_COOKIE_PATH,
                state.config.refresh_token_max_age_secs(),
                state.config.cookie_secure,
            ),
        ),
    ]);

    Ok((cookies, TokenResponse::bearer(access_token)))
}

pub(crate) fn clear_cookies(state: &AppState) -> SetCookies {
    AppendHeaders([
        (
            header::SET_COOKIE,
            build_clear_cookie(ACCESS_COOKIE_NAME, ACCESS_COOKIE_PATH, state.config.cookie_secure),
        ),
        (
            header::SET_COOKIE,
            build_clear_cookie(
                REFRESH_COOKIE_NAME,
                REFRESH_COOKIE_PATH,
                state.config.cookie_secure,
            ),
        ),
    ])
}

fn refresh_token_from_cookies(headers: &HeaderMap) -> Option<Uuid> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    let raw = extract_cookie_value(cookie_header, REFRESH_COOKIE_NAME)?;
    Uuid::parse_str(&raw).ok()
}
