#![allow(dead_code)] // OpenAPI doc stubs are only referenced by utoipa macros.

use crate::models::{
    form::{
        CreateFormQuery, Form, FormBatchRequest, FormResponse, Item, ItemOption, ItemResponse,
        ItemType, ListFormsQuery,
    },
    review::{Answer, AnswerPrompt, CreateAnswer, CreateReviewRequest, Review, ReviewResponse},
    user::{
        AdminUpdateUserRequest, LoginForm, RegisterRequest, TokenResponse, UpdateUserRequest,
        UserResponse,
    },
};
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        register_doc,
        login_doc,
        refresh_doc,
        logout_doc,
        abort_doc,
        me_doc,
        update_me_doc,
        delete_me_doc,
        admin_list_users_doc,
        admin_get_user_doc,
        admin_update_user_doc,
        admin_delete_user_doc,
        create_form_doc,
        list_forms_doc,
        get_form_doc,
        update_form_doc,
        form_to_review_doc,
        create_review_doc,
        list_reviews_doc,
        get_review_doc
    ),
    components(
        schemas(
            RegisterRequest,
            LoginForm,
            TokenResponse,
            UserResponse,
            UpdateUserRequest,
            AdminUpdateUserRequest,
            Form,
            Item,
            ItemOption,
            ItemType,
            ItemResponse,
            FormResponse,
            FormBatchRequest,
            Review,
            Answer,
            AnswerPrompt,
            CreateAnswer,
            CreateReviewRequest,
            ReviewResponse
        )
    ),
    modifiers(&SecuritySchemes),
    tags(
        (name = "Auth", description = "Registration, login and session management"),
        (name = "Users", description = "Profile and admin user management"),
        (name = "Forms", description = "Form building, copying and lifecycle"),
        (name = "Reviews", description = "Review submission and retrieval")
    ),
    security(("BearerAuth" = []))
)]
pub struct ApiDoc;

struct SecuritySchemes;

impl Modify for SecuritySchemes {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();

        let mut bearer = Http::new(HttpAuthScheme::Bearer);
        bearer.bearer_format = Some("JWT".to_string());

        components.add_security_scheme("BearerAuth", SecurityScheme::Http(bearer));
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 409, description = "Email already registered")
    ),
    tag = "Auth",
    security(())
)]
fn register_doc() {}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Cookies set, access token returned", body = TokenResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth",
    security(())
)]
fn login_doc() {}

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    responses(
        (status = 200, description = "Session rotated, new cookies set", body = TokenResponse),
        (status = 401, description = "Missing, invalid or expired refresh token")
    ),
    tag = "Auth",
    security(())
)]
fn refresh_doc() {}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 200, description = "Session revoked, cookies cleared")),
    tag = "Auth",
    security(())
)]
fn logout_doc() {}

#[utoipa::path(
    post,
    path = "/api/auth/abort",
    responses((status = 200, description = "All refresh sessions revoked")),
    tag = "Auth"
)]
fn abort_doc() {}

#[utoipa::path(
    get,
    path = "/api/users/me",
    responses((status = 200, description = "Authenticated user", body = UserResponse)),
    tag = "Users"
)]
fn me_doc() {}

#[utoipa::path(
    put,
    path = "/api/users/me",
    request_body = UpdateUserRequest,
    responses((status = 200, description = "Updated profile", body = UserResponse)),
    tag = "Users"
)]
fn update_me_doc() {}

#[utoipa::path(
    delete,
    path = "/api/users/me",
    responses((status = 200, description = "Account deactivated, cookies cleared")),
    tag = "Users"
)]
fn delete_me_doc() {}

#[utoipa::path(
    get,
    path = "/api/users",
    responses((status = 200, description = "Paginated user list")),
    tag = "Users"
)]
fn admin_list_users_doc() {}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = uuid::Uuid, Path, description = "User id")),
    responses((status = 200, body = UserResponse), (status = 404, description = "Unknown user")),
    tag = "Users"
)]
fn admin_get_user_doc() {}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = uuid::Uuid, Path, description = "User id")),
    request_body = AdminUpdateUserRequest,
    responses((status = 200, body = UserResponse)),
    tag = "Users"
)]
fn admin_update_user_doc() {}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = uuid::Uuid, Path, description = "User id")),
    responses((status = 200, description = "Account deactivated")),
    tag = "Users"
)]
fn admin_delete_user_doc() {}

#[utoipa::path(
    post,
    path = "/api/forms",
    params(CreateFormQuery),
    responses((status = 201, description = "New (or copied) form", body = FormResponse)),
    tag = "Forms"
)]
fn create_form_doc() {}

#[utoipa::path(
    get,
    path = "/api/forms",
    params(ListFormsQuery),
    responses((status = 200, description = "Paginated forms")),
    tag = "Forms"
)]
fn list_forms_doc() {}

#[utoipa::path(
    get,
    path = "/api/forms/{id}",
    params(("id" = i32, Path, description = "Form id")),
    responses(
        (status = 200, body = FormResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Unknown form")
    ),
    tag = "Forms"
)]
fn get_form_doc() {}

#[utoipa::path(
    put,
    path = "/api/forms/{id}",
    params(("id" = i32, Path, description = "Form id")),
    request_body = FormBatchRequest,
    responses(
        (status = 200, description = "Batch applied, form returned", body = FormResponse),
        (status = 204, description = "Batch applied"),
        (status = 409, description = "Stale expected order on delete")
    ),
    tag = "Forms"
)]
fn update_form_doc() {}

#[utoipa::path(
    post,
    path = "/api/forms/{id}",
    params(("id" = i32, Path, description = "Form id")),
    responses((status = 200, description = "Form opened for review")),
    tag = "Forms"
)]
fn form_to_review_doc() {}

#[utoipa::path(
    post,
    path = "/api/forms/{id}/reviews",
    params(("id" = i32, Path, description = "Form id")),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review stored", body = ReviewResponse),
        (status = 409, description = "Review already submitted")
    ),
    tag = "Reviews"
)]
fn create_review_doc() {}

#[utoipa::path(
    get,
    path = "/api/forms/{id}/reviews",
    params(("id" = i32, Path, description = "Form id")),
    responses((status = 200, description = "All reviews of the form")),
    tag = "Reviews"
)]
fn list_reviews_doc() {}

#[utoipa::path(
    get,
    path = "/api/forms/{form_id}/reviews/{review_id}",
    params(
        ("form_id" = i32, Path, description = "Form id"),
        ("review_id" = i32, Path, description = "Review id")
    ),
    responses((status = 200, body = ReviewResponse), (status = 404, description = "Unknown review")),
    tag = "Reviews"
)]
fn get_review_doc() {}
