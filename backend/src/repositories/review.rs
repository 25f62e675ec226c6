use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::review::{Answer, CreateAnswer, Review, ReviewResponse};

const REVIEW_COLUMNS: &str = "id, form_id, user_id, review_time, ready";
const ANSWER_COLUMNS: &str = "id, item_id, review_id, prompt";

pub async fn find_review_for_user(
    pool: &PgPool,
    form_id: i32,
    user_id: Uuid,
) -> Result<Option<Review>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM reviews WHERE form_id = $1 AND user_id = $2",
        REVIEW_COLUMNS
    );
    sqlx::query_as::<_, Review>(&query)
        .bind(form_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn find_review(pool: &PgPool, review_id: i32) -> Result<Option<Review>, sqlx::Error> {
    let query = format!("SELECT {} FROM reviews WHERE id = $1", REVIEW_COLUMNS);
    sqlx::query_as::<_, Review>(&query)
        .bind(review_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_answers(pool: &PgPool, review_id: i32) -> Result<Vec<Answer>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM answers WHERE review_id = $1 ORDER BY id",
        ANSWER_COLUMNS
    );
    sqlx::query_as::<_, Answer>(&query)
        .bind(review_id)
        .fetch_all(pool)
        .await
}

pub async fn list_reviews_for_form(
    pool: &PgPool,
    form_id: i32,
) -> Result<Vec<Review>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM reviews WHERE form_id = $1 ORDER BY review_time, id",
        REVIEW_COLUMNS
    );
    sqlx::query_as::<_, Review>(&query)
        .bind(form_id)
        .fetch_all(pool)
        .await
}

/// Inserts the review and every answer in one transaction; a failing
/// answer insert leaves no partial review behind.
pub async fn insert_review_with_answers(
    pool: &PgPool,
    form_id: i32,
    user_id: Uuid,
    ready: bool,
    answers: &[CreateAnswer],
) -> Result<ReviewResponse, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let review = sqlx::query_as::<_, Review>(&format!(
        "INSERT INTO reviews (form_id, user_id, ready) VALUES ($1, $2, $3) RETURNING {}",
        REVIEW_COLUMNS
    ))
    .bind(form_id)
    .bind(user_id)
    .bind(ready)
    .fetch_one(&mut *tx)
    .await?;

    let mut inserted = Vec::with_capacity(answers.len());
    for answer in answers {
        let row = sqlx::query_as::<_, Answer>(&format!(
            "INSERT INTO answers (item_id, review_id, prompt) VALUES ($1, $2, $3) RETURNING {}",
            ANSWER_COLUMNS
        ))
        .bind(answer.item_id)
        .bind(review.id)
        .bind(Json(&answer.prompt))
        .fetch_one(&mut *tx)
        .await?;
        inserted.push(row);
    }

    tx.commit().await?;
    Ok(ReviewResponse {
        review,
        answers: inserted,
    })
}
