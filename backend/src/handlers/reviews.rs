use std::collections::{HashMap, HashSet};

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppError,
    handlers::forms::ensure_form_owner,
    models::{
        form::{Item, ItemOption},
        review::{AnswerPrompt, CreateAnswer, CreateReviewRequest, ReviewResponse},
        user::User,
    },
    repositories::{form as form_repo, review as review_repo},
    state::AppState,
};

/// `POST /api/forms/{id}/reviews` submits one review per user per form.
pub async fn create_review(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(form_id): Path<i32>,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), AppError> {
    form_repo::find_form(&state.pool, form_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Form {} not found", form_id)))?;

    if review_repo::find_review_for_user(&state.pool, form_id, user.id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "A review for this form already exists".into(),
        ));
    }

    let items = form_repo::list_items(&state.pool, form_id).await?;
    let options = form_repo::list_options_for_form(&state.pool, form_id).await?;
    validate_answers(&payload.answers, &items, &options)?;

    let response = review_repo::insert_review_with_answers(
        &state.pool,
        form_id,
        user.id,
        payload.ready,
        &payload.answers,
    )
    .await?;
    tracing::debug!(form_id, review_id = response.review.id, "review submitted");

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list_reviews(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(form_id): Path<i32>,
) -> Result<Json<Vec<ReviewResponse>>, AppError> {
    let form = form_repo::find_form(&state.pool, form_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Form {} not found", form_id)))?;
    ensure_form_owner(&form, &user)?;

    let reviews = review_repo::list_reviews_for_form(&state.pool, form_id).await?;
    let mut responses = Vec::with_capacity(reviews.len());
    for review in reviews {
        let answers = review_repo::list_answers(&state.pool, review.id).await?;
        responses.push(ReviewResponse { review, answers });
    }
    Ok(Json(responses))
}

pub async fn get_review(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path((form_id, review_id)): Path<(i32, i32)>,
) -> Result<Json<ReviewResponse>, AppError> {
    let form = form_repo::find_form(&state.pool, form_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Form {} not found", form_id)))?;
    ensure_form_owner(&form, &user)?;

    let review = review_repo::find_review(&state.pool, review_id)
        .await?
        .filter(|r| r.form_id == form_id)
        .ok_or_else(|| AppError::NotFound(format!("Review {} not found", review_id)))?;
    let answers = review_repo::list_answers(&state.pool, review.id).await?;
    Ok(Json(ReviewResponse { review, answers }))
}

/// Rejects answers whose prompt shape does not match the item's type, that
/// reference items outside the form, or that select options not belonging
/// to their item.
fn validate_answers(
    answers: &[CreateAnswer],
    items: &[Item],
    options: &[ItemOption],
) -> Result<(), AppError> {
    let items_by_id: HashMap<i32, &Item> = items.iter().map(|i| (i.id, i)).collect();
    let mut options_by_item: HashMap<i32, HashSet<i32>> = HashMap::new();
    for option in options {
        options_by_item
            .entry(option.item_id)
            .or_default()
            .insert(option.id);
    }

    let mut answered: HashSet<i32> = HashSet::new();
    for answer in answers {
        let item = items_by_id
            .get(&answer.item_id)
            .ok_or_else(|| AppError::NotFound(format!("Item {} not found in form", answer.item_id)))?;
        if !answered.insert(item.id) {
            return Err(AppError::BadRequest(format!(
                "Multiple answers for item {}",
                item.id
            )));
        }

        match &answer.prompt {
            AnswerPrompt::Choice { options } => {
                if !item.item_type.is_choice() {
                    return Err(AppError::BadRequest(format!(
                        "Item {} expects a text answer",
                        item.id
                    )));
                }
                let known = options_by_item.get(&item.id);
                for option_id in options {
                    if !known.is_some_and(|set| set.contains(option_id)) {
                        return Err(AppError::BadRequest(format!(
                            "Option {} does not belong to item {}",
                            option_id, item.id
                        )));
                    }
                }
            }
            AnswerPrompt::Text { .. } => {
                if item.item_type.is_choice() {
                    return Err(AppError::BadRequest(format!(
                        "Item {} expects selected options",
                        item.id
                    )));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::form::ItemType;

    fn item(id: i32, item_type: ItemType) -> Item {
        Item {
            id,
            title: None,
            description: None,
            item_type,
            item_order: id,
            required: false,
            form_id: 1,
        }
    }

    fn option(id: i32, item_id: i32) -> ItemOption {
        ItemOption {
            id,
            title: None,
            item_id,
        }
    }

    #[test]
    fn accepts_matching_prompt_shapes() {
        let items = vec![item(1, ItemType::ChoiceQuestion), item(2, ItemType::TextQuestion)];
        let options = vec![option(10, 1), option(11, 1)];
        let answers = vec![
            CreateAnswer {
                item_id: 1,
                prompt: AnswerPrompt::Choice { options: vec![10] },
            },
            CreateAnswer {
                item_id: 2,
                prompt: AnswerPrompt::Text {
                    text: "fine".into(),
                },
            },
        ];
        assert!(validate_answers(&answers, &items, &options).is_ok());
    }

    #[test]
    fn rejects_text_prompt_on_choice_item() {
        let items = vec![item(1, ItemType::MultichoiceQuestion)];
        let answers = vec![CreateAnswer {
            item_id: 1,
            prompt: AnswerPrompt::Text { text: "no".into() },
        }];
        assert!(matches!(
            validate_answers(&answers, &items, &[]),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn rejects_foreign_option_id() {
        let items = vec![item(1, ItemType::ChoiceQuestion)];
        let options = vec![option(10, 1)];
        let answers = vec![CreateAnswer {
            item_id: 1,
            prompt: AnswerPrompt::Choice { options: vec![99] },
        }];
        assert!(matches!(
            validate_answers(&answers, &items, &options),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn rejects_answer_for_unknown_item() {
        let answers = vec![CreateAnswer {
            item_id: 7,
            prompt: AnswerPrompt::Text { text: "x".into() },
        }];
        assert!(matches!(
            validate_answers(&answers, &[], &[]),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn rejects_duplicate_answers_for_one_item() {
        let items = vec![item(1, ItemType::TextQuestion)];
        let answers = vec![
            CreateAnswer {
                item_id: 1,
                prompt: AnswerPrompt::Text { text: "a".into() },
            },
            CreateAnswer {
                item_id: 1,
                prompt: AnswerPrompt::Text { text: "b".into() },
            },
        ];
        assert!(matches!(
            validate_answers(&answers, &items, &[]),
            Err(AppError::BadRequest(_))
        ));
    }
}
