use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{
    error::AppError,
    models::{
        form::{CreateFormQuery, Form, FormBatchRequest, FormResponse, ListFormsQuery},
        user::User,
        PaginatedResponse, PaginationQuery,
    },
    repositories::form as form_repo,
    repositories::transaction::{begin_transaction, commit_transaction},
    services::form_batch,
    state::AppState,
};

/// `POST /api/forms` creates an empty form; with `?id={source}` it
/// deep-copies an existing form (typically a template) instead.
pub async fn create_form(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<CreateFormQuery>,
) -> Result<(StatusCode, Json<FormResponse>), AppError> {
    let response = match query.id {
        Some(source_id) => {
            let form = form_repo::copy_form(
                &state.pool,
                source_id,
                user.id,
                &state.config.frontend_base_url,
            )
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Form {} not found", source_id)))?;
            tracing::debug!(source_id, new_id = form.id, "copied form");
            form_repo::load_form_response(&state.pool, form.id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Form {} not found", form.id)))?
        }
        None => {
            // Two-step create: the link embeds the id, which exists only
            // after the insert.
            let mut tx = begin_transaction(&state.pool).await?;
            let form = form_repo::insert_form(&mut tx, user.id).await?;
            let link = format!("{}/forms/{}", state.config.frontend_base_url, form.id);
            let form = form_repo::set_form_link(&mut tx, form.id, &link).await?;
            commit_transaction(tx).await?;
            form_repo::assemble_form_response(form, Vec::new(), Vec::new())
        }
    };

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list_forms(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(filters): Query<ListFormsQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<Form>>, AppError> {
    let limit = pagination.limit();
    let offset = pagination.offset();
    let creator = if filters.my.unwrap_or(false) {
        Some(user.id)
    } else {
        None
    };
    let forms = form_repo::list_forms(
        &state.pool,
        filters.is_template.unwrap_or(false),
        creator,
        limit,
        offset,
    )
    .await?;
    Ok(Json(PaginatedResponse::new(forms, limit, offset)))
}

pub async fn get_form(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(form_id): Path<i32>,
) -> Result<Json<FormResponse>, AppError> {
    let response = form_repo::load_form_response(&state.pool, form_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Form {} not found", form_id)))?;
    ensure_form_owner(&response.form, &user)?;
    Ok(Json(response))
}

/// `PUT /api/forms/{id}` applies a batch of edit operations atomically.
pub async fn update_form(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(form_id): Path<i32>,
    Json(payload): Json<FormBatchRequest>,
) -> Result<Response, AppError> {
    let form = form_repo::find_form(&state.pool, form_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Form {} not found", form_id)))?;
    ensure_form_owner(&form, &user)?;

    form_batch::apply_batch(&state.pool, form_id, &payload.requests).await?;

    if payload.include_form_in_response {
        let response = form_repo::load_form_response(&state.pool, form_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Form {} not found", form_id)))?;
        Ok(Json(response).into_response())
    } else {
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}

/// `POST /api/forms/{id}` marks the form ready to collect reviews.
pub async fn form_to_review(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(form_id): Path<i32>,
) -> Result<Json<serde_json::Value>, AppError> {
    let form = form_repo::find_form(&state.pool, form_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Form {} not found", form_id)))?;
    ensure_form_owner(&form, &user)?;

    form_repo::set_form_to_review(&state.pool, form_id).await?;
    Ok(Json(json!({ "message": "Form opened for review" })))
}

pub(crate) fn ensure_form_owner(form: &Form, user: &User) -> Result<(), AppError> {
    if form.creator_id == Some(user.id) || user.is_superuser {
        Ok(())
    } else {
        Err(AppError::Forbidden("Not the form owner".into()))
    }
}
