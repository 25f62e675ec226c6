use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::{
    error::AppError,
    models::user::User,
    repositories::user as user_repo,
    state::AppState,
    utils::{
        cookies::{extract_cookie_value, ACCESS_COOKIE_NAME},
        jwt::{verify_access_token, Claims},
    },
};

/// Requires a valid access token. The token is read from the
/// `Authorization: Bearer` header first, then from the access cookie.
/// The authenticated [`User`] and [`Claims`] are inserted into request
/// extensions for handlers to extract.
pub async fn auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (claims, user) = authenticate_request(request.headers(), &state).await?;
    request.extensions_mut().insert(claims);
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Same as [`auth`] but additionally requires the superuser flag.
pub async fn auth_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (claims, user) = authenticate_request(request.headers(), &state).await?;
    if !user.is_superuser {
        return Err(AppError::Forbidden("Superuser privileges required".into()));
    }
    request.extensions_mut().insert(claims);
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

async fn authenticate_request(
    headers: &HeaderMap,
    state: &AppState,
) -> Result<(Claims, User), AppError> {
    let token = extract_token(headers).ok_or(AppError::InvalidToken)?;
    let claims = verify_access_token(&token, &state.config.secret_key, &state.config.algorithm)
        .map_err(classify_token_error)?;
    let user_id = claims.user_id().ok_or(AppError::InvalidToken)?;

    let user = user_repo::find_user_by_id(&state.pool, user_id)
        .await?
        .ok_or(AppError::InvalidToken)?;
    if !user.is_active {
        return Err(AppError::Forbidden("Account is deactivated".into()));
    }

    Ok((claims, user))
}

fn classify_token_error(err: anyhow::Error) -> AppError {
    match err.downcast_ref::<jsonwebtoken::errors::Error>() {
        Some(e) if matches!(e.kind(), jsonwebtoken::errors::ErrorKind::ExpiredSignature) => {
            AppError::TokenExpired
        }
        _ => AppError::InvalidToken,
    }
}

fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        if let Ok(value) = value.to_str() {
            if let Some(token) = value.strip_prefix("Bearer ") {
                return Some(token.trim().to_string());
            }
        }
    }
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    extract_cookie_value(cookie_header, ACCESS_COOKIE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer header-token"),
        );
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("access_token=cookie-token"),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("header-token"));
    }

    #[test]
    fn falls_back_to_access_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; access_token=cookie-token"),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("cookie-token"));
    }

    #[test]
    fn missing_credentials_yield_none() {
        assert_eq!(extract_token(&HeaderMap::new()), None);
    }
}
