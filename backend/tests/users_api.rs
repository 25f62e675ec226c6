use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use localforms_backend::{
    build_router,
    models::user::User,
    repositories::{refresh_session as session_repo, user as user_repo},
    state::AppState,
    utils::password::verify_password,
};

mod support;

async fn app() -> (Router, AppState) {
    let state = support::migrated_state().await;
    (build_router(state.clone()), state)
}

async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    user: &User,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, support::bearer_for(user));
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    app.clone()
        .oneshot(builder.body(body).expect("build request"))
        .await
        .expect("send request")
}

#[tokio::test]
async fn duplicate_email_registration_conflicts() {
    let (app, state) = app().await;
    let user = support::seed_user(&state.pool, false).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "email": user.email,
                        "full_name": "Impostor",
                        "password": "long-enough-password"
                    })
                    .to_string(),
                ))
                .expect("build request"),
        )
        .await
        .expect("send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[tokio::test]
async fn me_returns_the_authenticated_user_without_the_hash() {
    let (app, state) = app().await;
    let user = support::seed_user(&state.pool, false).await;

    let response = send_json(&app, "GET", "/api/users/me", &user, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id"].as_str(), Some(user.id.to_string().as_str()));
    assert_eq!(body["email"], user.email.as_str());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn self_update_changes_profile_but_never_privileges() {
    let (app, state) = app().await;
    let user = support::seed_user(&state.pool, false).await;

    let response = send_json(
        &app,
        "PUT",
        "/api/users/me",
        &user,
        Some(json!({
            "full_name": "Renamed",
            "password": "a-brand-new-password",
            // Unknown fields are ignored, not applied.
            "is_superuser": true
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["full_name"], "Renamed");
    assert_eq!(body["is_superuser"], false);

    let stored = user_repo::find_user_by_id(&state.pool, user.id)
        .await
        .expect("query user")
        .expect("user exists");
    assert!(!stored.is_superuser);
    assert!(verify_password("a-brand-new-password", &stored.password_hash).expect("verify"));
}

#[tokio::test]
async fn self_delete_is_a_soft_delete_that_keeps_forms() {
    let (app, state) = app().await;
    let user = support::seed_user(&state.pool, false).await;

    let response = send_json(&app, "POST", "/api/forms", &user, None).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let form_id = body_json(response).await["id"].as_i64().expect("id");

    let response = send_json(&app, "DELETE", "/api/users/me", &user, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let stored = user_repo::find_user_by_id(&state.pool, user.id)
        .await
        .expect("query user")
        .expect("row must remain");
    assert!(!stored.is_active);

    let form = localforms_backend::repositories::form::find_form(&state.pool, form_id as i32)
        .await
        .expect("query form")
        .expect("form must remain");
    assert_eq!(form.creator_id, Some(user.id));

    // A deactivated account no longer passes the auth middleware.
    let response = send_json(&app, "GET", "/api/users/me", &user, None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn deactivation_revokes_open_sessions() {
    let (app, state) = app().await;
    let user = support::seed_user(&state.pool, false).await;
    let token = Uuid::new_v4();
    session_repo::insert_refresh_session(&state.pool, user.id, token, 3600)
        .await
        .expect("insert session");

    let response = send_json(&app, "DELETE", "/api/users/me", &user, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let session = session_repo::find_session_by_token(&state.pool, token)
        .await
        .expect("query session");
    assert!(session.is_none());
}

#[tokio::test]
async fn admin_routes_require_the_superuser_flag() {
    let (app, state) = app().await;
    let user = support::seed_user(&state.pool, false).await;

    let response = send_json(&app, "GET", "/api/users", &user, None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_can_list_fetch_update_and_deactivate_users() {
    let (app, state) = app().await;
    let admin = support::seed_user(&state.pool, true).await;
    let subject = support::seed_user(&state.pool, false).await;

    let response = send_json(&app, "GET", "/api/users?limit=500", &admin, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let listed = body["data"].as_array().expect("data");
    assert!(listed
        .iter()
        .any(|u| u["id"].as_str() == Some(subject.id.to_string().as_str())));

    let uri = format!("/api/users/{}", subject.id);
    let response = send_json(&app, "GET", &uri, &admin, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send_json(
        &app,
        "PUT",
        &uri,
        &admin,
        Some(json!({ "is_superuser": true, "is_verified": true })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["is_superuser"], true);
    assert_eq!(body["is_verified"], true);

    let response = send_json(&app, "DELETE", &uri, &admin, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let stored = user_repo::find_user_by_id(&state.pool, subject.id)
        .await
        .expect("query user")
        .expect("row must remain");
    assert!(!stored.is_active);
}

#[tokio::test]
async fn admin_fetch_of_unknown_user_is_not_found() {
    let (app, state) = app().await;
    let admin = support::seed_user(&state.pool, true).await;

    let uri = format!("/api/users/{}", Uuid::new_v4());
    let response = send_json(&app, "GET", &uri, &admin, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
