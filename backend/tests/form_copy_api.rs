use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use localforms_backend::{build_router, models::user::User, state::AppState};

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

/// Builds a template form with two items and options on the first one.
async fn seed_template(app: &Router, user: &User) -> Value {
    let response = send_json(app, "POST", "/api/forms", user, None).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let form_id = body_json(response).await["id"].as_i64().expect("id");

    let response = send_json(
        app,
        "PUT",
        &format!("/api/forms/{form_id}"),
        user,
        Some(json!({
            "include_form_in_response": true,
            "requests": [
                { "type": "updateForm", "title": "Weekly check-in", "is_template": true, "color": "green" },
                { "type": "createItem", "item_order": 1, "title": "mood", "item_type": "choiceQuestion", "required": true },
                { "type": "createItem", "item_order": 2, "title": "notes", "item_type": "longTextQuestion" }
            ]
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let form = body_json(response).await;
    let item_id = form["items"][0]["id"].as_i64().expect("item id");

    let response = send_json(
        app,
        "PUT",
        &format!("/api/forms/{form_id}"),
        user,
        Some(json!({
            "include_form_in_response": true,
            "requests": [
                { "type": "createOption", "item_id": item_id, "title": "good" },
                { "type": "createOption", "item_id": item_id, "title": "bad" }
            ]
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

#[tokio::test]
async fn new_form_gets_defaults_and_a_link_embedding_its_id() {
    let (app, state) = app().await;
    let user = support::seed_user(&state.pool, false).await;

    let response = send_json(&app, "POST", "/api/forms", &user, None).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let form = body_json(response).await;

    let id = form["id"].as_i64().expect("id");
    assert_eq!(
        form["link"].as_str(),
        Some(format!("http://localhost:3000/forms/{id}").as_str())
    );
    assert_eq!(form["organization"], "okb.jpg");
    assert_eq!(form["color"], "red");
    assert_eq!(form["is_template"], false);
    assert_eq!(form["to_review"], false);
    assert_eq!(form["creator_id"].as_str(), Some(user.id.to_string().as_str()));
    assert_eq!(form["items"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn copy_mirrors_items_and_options_with_new_identity() {
    let (app, state) = app().await;
    let author = support::seed_user(&state.pool, false).await;
    let copier = support::seed_user(&state.pool, false).await;
    let template = seed_template(&app, &author).await;
    let source_id = template["id"].as_i64().expect("id");

    let response = send_json(
        &app,
        "POST",
        &format!("/api/forms?id={source_id}"),
        &copier,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let copy = body_json(response).await;

    assert_ne!(copy["id"], template["id"]);
    assert_eq!(copy["title"], template["title"]);
    assert_eq!(copy["color"], template["color"]);
    assert_eq!(copy["is_template"], false, "copies are never templates");
    assert_eq!(copy["to_review"], false);
    assert_eq!(
        copy["creator_id"].as_str(),
        Some(copier.id.to_string().as_str())
    );
    let copy_id = copy["id"].as_i64().expect("id");
    assert_eq!(
        copy["link"].as_str(),
        Some(format!("http://localhost:3000/forms/{copy_id}").as_str())
    );

    let source_items = template["items"].as_array().expect("items");
    let copy_items = copy["items"].as_array().expect("items");
    assert_eq!(copy_items.len(), source_items.len());
    for (source, copied) in source_items.iter().zip(copy_items) {
        assert_ne!(copied["id"], source["id"]);
        assert_eq!(copied["title"], source["title"]);
        assert_eq!(copied["item_type"], source["item_type"]);
        assert_eq!(copied["item_order"], source["item_order"]);
        assert_eq!(copied["required"], source["required"]);

        let source_options = source["options"].as_array().expect("options");
        let copied_options = copied["options"].as_array().expect("options");
        assert_eq!(copied_options.len(), source_options.len());
        for (source_option, copied_option) in source_options.iter().zip(copied_options) {
            assert_ne!(copied_option["id"], source_option["id"]);
            assert_eq!(copied_option["title"], source_option["title"]);
        }
    }
}

#[tokio::test]
async fn copying_a_missing_form_is_not_found() {
    let (app, state) = app().await;
    let user = support::seed_user(&state.pool, false).await;

    let response = send_json(&app, "POST", "/api/forms?id=999999", &user, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn to_review_is_owner_only() {
    let (app, state) = app().await;
    let owner = support::seed_user(&state.pool, false).await;
    let stranger = support::seed_user(&state.pool, false).await;

    let response = send_json(&app, "POST", "/api/forms", &owner, None).await;
    let form_id = body_json(response).await["id"].as_i64().expect("id");

    let response = send_json(&app, "POST", &format!("/api/forms/{form_id}"), &stranger, None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send_json(&app, "POST", &format!("/api/forms/{form_id}"), &owner, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send_json(&app, "GET", &format!("/api/forms/{form_id}"), &owner, None).await;
    assert_eq!(body_json(response).await["to_review"], true);
}

#[tokio::test]
async fn listing_supports_template_and_ownership_filters() {
    let (app, state) = app().await;
    let user = support::seed_user(&state.pool, false).await;
    let other = support::seed_user(&state.pool, false).await;

    seed_template(&app, &user).await;
    let response = send_json(&app, "POST", "/api/forms", &other, None).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send_json(&app, "GET", "/api/forms?is_template=true", &user, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let forms = body["data"].as_array().expect("data");
    assert!(!forms.is_empty());
    assert!(forms.iter().all(|f| f["is_template"] == true));

    let response = send_json(&app, "GET", "/api/forms?my=true", &other, None).await;
    let body = body_json(response).await;
    let forms = body["data"].as_array().expect("data");
    assert!(!forms.is_empty());
    assert!(forms
        .iter()
        .all(|f| f["creator_id"].as_str() == Some(other.id.to_string().as_str())));
}
