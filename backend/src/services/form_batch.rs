//! Batched form mutation processor.
//!
//! Applies an ordered list of heterogeneous edit operations to one form
//! inside a single transaction, keeping the item_order values of the form
//! a dense 1..N permutation. Any failing operation rolls back the whole
//! batch.

use sqlx::{PgConnection, PgPool};

use crate::error::AppError;
use crate::models::form::FormOperation;
use crate::repositories::form as form_repo;
use crate::repositories::form::ITEM_ORDER_ORIGIN;
use crate::repositories::transaction::{begin_transaction, commit_transaction};

/// Applies every operation in order and commits once. The caller has
/// already verified the form exists and the requester owns it.
pub async fn apply_batch(
    pool: &PgPool,
    form_id: i32,
    operations: &[FormOperation],
) -> Result<(), AppError> {
    let mut tx = begin_transaction(pool).await?;

    for operation in operations {
        apply_operation(&mut tx, form_id, operation).await?;
    }

    commit_transaction(tx).await
}

async fn apply_operation(
    conn: &mut PgConnection,
    form_id: i32,
    operation: &FormOperation,
) -> Result<(), AppError> {
    match operation {
        FormOperation::UpdateForm {
            title,
            description,
            is_template,
            organization,
            color,
        } => {
            form_repo::update_form_fields(
                conn,
                form_id,
                title.as_deref(),
                description.as_deref(),
                *is_template,
                organization.as_deref(),
                color.as_deref(),
            )
            .await?;
        }
        FormOperation::CreateItem {
            item_order,
            title,
            description,
            item_type,
            required,
        } => {
            // Clamp the requested slot into [1, N+1] so a stale client
            // cannot punch a hole in the ordering.
            let count = form_repo::count_items(conn, form_id).await? as i32;
            let position = (*item_order).clamp(ITEM_ORDER_ORIGIN, count + 1);
            form_repo::insert_item_at(
                conn,
                form_id,
                position,
                title.as_deref(),
                description.as_deref(),
                *item_type,
                *required,
            )
            .await?;
        }
        FormOperation::MoveItem {
            from_order,
            to_order,
        } => {
            let item = form_repo::find_item_at_order(conn, form_id, *from_order)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("No item at order {} in form", from_order))
                })?;
            let count = form_repo::count_items(conn, form_id).await? as i32;
            let to_order = (*to_order).clamp(ITEM_ORDER_ORIGIN, count);
            form_repo::move_item(conn, form_id, item.id, *from_order, to_order).await?;
        }
        FormOperation::DeleteItem { id, item_order } => {
            let item = form_repo::find_item_in_form(conn, form_id, *id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Item {} not found in form", id)))?;
            if item.item_order != *item_order {
                // Stale client: the item moved since it was fetched.
                return Err(AppError::Conflict(format!(
                    "Item {} is at order {}, expected {}",
                    id, item.item_order, item_order
                )));
            }
            form_repo::delete_item_and_close_gap(conn, form_id, item.id, item.item_order).await?;
        }
        FormOperation::UpdateItem {
            id,
            title,
            description,
            item_type,
            required,
        } => {
            let updated = form_repo::update_item_fields(
                conn,
                form_id,
                *id,
                title.as_deref(),
                description.as_deref(),
                *item_type,
                *required,
            )
            .await?;
            if !updated {
                return Err(AppError::NotFound(format!("Item {} not found in form", id)));
            }
        }
        FormOperation::CreateOption { item_id, title } => {
            match form_repo::insert_option(conn, form_id, *item_id, title.as_deref()).await {
                Ok(_) => {}
                Err(sqlx::Error::RowNotFound) => {
                    return Err(AppError::NotFound(format!(
                        "Item {} not found in form",
                        item_id
                    )));
                }
                Err(e) => return Err(e.into()),
            }
        }
        FormOperation::DeleteOption { id } => {
            if !form_repo::delete_option(conn, form_id, *id).await? {
                return Err(AppError::NotFound(format!(
                    "Option {} not found in form",
                    id
                )));
            }
        }
        FormOperation::UpdateOption { id, title } => {
            if !form_repo::update_option(conn, form_id, *id, title.as_deref()).await? {
                return Err(AppError::NotFound(format!(
                    "Option {} not found in form",
                    id
                )));
            }
        }
    }
    Ok(())
}
