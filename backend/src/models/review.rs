//! Models for reviews (submissions) and their per-item answers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Review {
    pub id: i32,
    pub form_id: i32,
    pub user_id: Uuid,
    pub review_time: DateTime<Utc>,
    pub ready: bool,
}

/// Answer payload; shape depends on the referenced item's type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum AnswerPrompt {
    /// Selected option ids for choice / multi-choice items.
    Choice { options: Vec<i32> },
    /// Free text for short/long text items.
    Text { text: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Answer {
    pub id: i32,
    pub item_id: i32,
    pub review_id: i32,
    #[schema(value_type = AnswerPrompt)]
    pub prompt: sqlx::types::Json<AnswerPrompt>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateAnswer {
    #[serde(alias = "itemId")]
    pub item_id: i32,
    pub prompt: AnswerPrompt,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    pub answers: Vec<CreateAnswer>,
    /// Marks the submission as final; drafts may post `false`.
    #[serde(default = "default_ready")]
    pub ready: bool,
}

fn default_ready() -> bool {
    true
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewResponse {
    #[serde(flatten)]
    pub review: Review,
    pub answers: Vec<Answer>,
}
