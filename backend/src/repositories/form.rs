//! Queries for forms, items, and options.
//!
//! Read helpers run against the pool; everything used by the batch
//! processor takes a `PgConnection` so it can run inside the caller's
//! transaction and observe the transaction's own uncommitted writes.

use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::form::{Form, FormResponse, Item, ItemOption, ItemResponse, ItemType};
use crate::repositories::common::push_clause;

const FORM_COLUMNS: &str = "id, title, description, is_template, organization, color, to_review, \
                            created_at, link, creator_id";
const ITEM_COLUMNS: &str = "id, title, description, item_type, item_order, required, form_id";
const OPTION_COLUMNS: &str = "id, title, item_id";

/// The first item in a form sits at this order.
pub const ITEM_ORDER_ORIGIN: i32 = 1;

// ---------------------------------------------------------------------------
// Form rows

pub async fn insert_form(conn: &mut PgConnection, creator_id: Uuid) -> Result<Form, sqlx::Error> {
    let query = format!(
        "INSERT INTO forms (creator_id) VALUES ($1) RETURNING {}",
        FORM_COLUMNS
    );
    sqlx::query_as::<_, Form>(&query)
        .bind(creator_id)
        .fetch_one(conn)
        .await
}

/// Second step of form creation: the link embeds the id, which is only
/// known after the insert.
pub async fn set_form_link(
    conn: &mut PgConnection,
    form_id: i32,
    link: &str,
) -> Result<Form, sqlx::Error> {
    let query = format!(
        "UPDATE forms SET link = $1 WHERE id = $2 RETURNING {}",
        FORM_COLUMNS
    );
    sqlx::query_as::<_, Form>(&query)
        .bind(link)
        .bind(form_id)
        .fetch_one(conn)
        .await
}

pub async fn find_form(pool: &PgPool, form_id: i32) -> Result<Option<Form>, sqlx::Error> {
    let query = format!("SELECT {} FROM forms WHERE id = $1", FORM_COLUMNS);
    sqlx::query_as::<_, Form>(&query)
        .bind(form_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_forms(
    pool: &PgPool,
    templates_only: bool,
    creator_id: Option<Uuid>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Form>, sqlx::Error> {
    let mut builder =
        QueryBuilder::<Postgres>::new(format!("SELECT {} FROM forms", FORM_COLUMNS));
    let mut has_clause = false;
    if templates_only {
        push_clause(&mut builder, &mut has_clause);
        builder.push("is_template = TRUE");
    }
    if let Some(creator) = creator_id {
        push_clause(&mut builder, &mut has_clause);
        builder.push("creator_id = ").push_bind(creator);
    }
    builder.push(" ORDER BY created_at, id LIMIT ");
    builder.push_bind(limit);
    builder.push(" OFFSET ");
    builder.push_bind(offset);

    builder.build_query_as::<Form>().fetch_all(pool).await
}

pub async fn set_form_to_review(pool: &PgPool, form_id: i32) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE forms SET to_review = TRUE WHERE id = $1")
        .bind(form_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Applies the field subset carried by an update-form operation; absent
/// fields keep their current value. `None` means "leave alone", so a field
/// that was once set cannot be cleared back to null through this path.
#[allow(clippy::too_many_arguments)]
pub async fn update_form_fields(
    conn: &mut PgConnection,
    form_id: i32,
    title: Option<&str>,
    description: Option<&str>,
    is_template: Option<bool>,
    organization: Option<&str>,
    color: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE forms SET \
            title = COALESCE($1, title), \
            description = COALESCE($2, description), \
            is_template = COALESCE($3, is_template), \
            organization = COALESCE($4, organization), \
            color = COALESCE($5, color) \
         WHERE id = $6",
    )
    .bind(title)
    .bind(description)
    .bind(is_template)
    .bind(organization)
    .bind(color)
    .bind(form_id)
    .execute(conn)
    .await
    .map(|_| ())
}

// ---------------------------------------------------------------------------
// Items

pub async fn list_items(pool: &PgPool, form_id: i32) -> Result<Vec<Item>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM items WHERE form_id = $1 ORDER BY item_order",
        ITEM_COLUMNS
    );
    sqlx::query_as::<_, Item>(&query)
        .bind(form_id)
        .fetch_all(pool)
        .await
}

pub async fn find_item_in_form(
    conn: &mut PgConnection,
    form_id: i32,
    item_id: i32,
) -> Result<Option<Item>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM items WHERE id = $1 AND form_id = $2",
        ITEM_COLUMNS
    );
    sqlx::query_as::<_, Item>(&query)
        .bind(item_id)
        .bind(form_id)
        .fetch_optional(conn)
        .await
}

pub async fn find_item_at_order(
    conn: &mut PgConnection,
    form_id: i32,
    item_order: i32,
) -> Result<Option<Item>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM items WHERE form_id = $1 AND item_order = $2",
        ITEM_COLUMNS
    );
    sqlx::query_as::<_, Item>(&query)
        .bind(form_id)
        .bind(item_order)
        .fetch_optional(conn)
        .await
}

pub async fn count_items(conn: &mut PgConnection, form_id: i32) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM items WHERE form_id = $1")
        .bind(form_id)
        .fetch_one(conn)
        .await
}

/// Opens a slot at `item_order` by shifting everything at or after it one
/// place down the list, then inserts the new item into the gap.
pub async fn insert_item_at(
    conn: &mut PgConnection,
    form_id: i32,
    item_order: i32,
    title: Option<&str>,
    description: Option<&str>,
    item_type: ItemType,
    required: bool,
) -> Result<Item, sqlx::Error> {
    sqlx::query("UPDATE items SET item_order = item_order + 1 WHERE form_id = $1 AND item_order >= $2")
        .bind(form_id)
        .bind(item_order)
        .execute(&mut *conn)
        .await?;

    let query = format!(
        "INSERT INTO items (title, description, item_type, item_order, required, form_id) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
        ITEM_COLUMNS
    );
    sqlx::query_as::<_, Item>(&query)
        .bind(title)
        .bind(description)
        .bind(item_type)
        .bind(item_order)
        .bind(required)
        .bind(form_id)
        .fetch_one(conn)
        .await
}

/// Relocates `item_id` from `from_order` to `to_order`, closing the gap it
/// leaves and opening one at the destination. A single statement so no
/// intermediate ordering is ever observable outside the transaction.
pub async fn move_item(
    conn: &mut PgConnection,
    form_id: i32,
    item_id: i32,
    from_order: i32,
    to_order: i32,
) -> Result<(), sqlx::Error> {
    if to_order < from_order {
        // Everything in [to, from) slides down one slot.
        sqlx::query(
            "UPDATE items SET item_order = CASE WHEN id = $1 THEN $2 ELSE item_order + 1 END \
             WHERE form_id = $3 AND (id = $1 OR (item_order >= $2 AND item_order < $4))",
        )
        .bind(item_id)
        .bind(to_order)
        .bind(form_id)
        .bind(from_order)
        .execute(conn)
        .await?;
    } else if to_order > from_order {
        // Everything in (from, to] slides up one slot.
        sqlx::query(
            "UPDATE items SET item_order = CASE WHEN id = $1 THEN $2 ELSE item_order - 1 END \
             WHERE form_id = $3 AND (id = $1 OR (item_order > $4 AND item_order <= $2))",
        )
        .bind(item_id)
        .bind(to_order)
        .bind(form_id)
        .bind(from_order)
        .execute(conn)
        .await?;
    }
    Ok(())
}

/// Deletes the item and closes the gap by shifting every later item back
/// one place. Options and answers go with it via FK cascade.
pub async fn delete_item_and_close_gap(
    conn: &mut PgConnection,
    form_id: i32,
    item_id: i32,
    item_order: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM items WHERE id = $1")
        .bind(item_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query(
        "UPDATE items SET item_order = item_order - 1 WHERE form_id = $1 AND item_order > $2",
    )
    .bind(form_id)
    .bind(item_order)
    .execute(conn)
    .await
    .map(|_| ())
}

/// Partial item update with the same contract as [`update_form_fields`]:
/// `None` fields are untouched and cannot be used to null a column out.
pub async fn update_item_fields(
    conn: &mut PgConnection,
    form_id: i32,
    item_id: i32,
    title: Option<&str>,
    description: Option<&str>,
    item_type: Option<ItemType>,
    required: Option<bool>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE items SET \
            title = COALESCE($1, title), \
            description = COALESCE($2, description), \
            item_type = COALESCE($3, item_type), \
            required = COALESCE($4, required) \
         WHERE id = $5 AND form_id = $6",
    )
    .bind(title)
    .bind(description)
    .bind(item_type)
    .bind(required)
    .bind(item_id)
    .bind(form_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

// ---------------------------------------------------------------------------
// Options

/// All options belonging to any item of the given form.
pub async fn list_options_for_form(
    pool: &PgPool,
    form_id: i32,
) -> Result<Vec<ItemOption>, sqlx::Error> {
    sqlx::query_as::<_, ItemOption>(
        "SELECT o.id, o.title, o.item_id FROM options o \
         JOIN items i ON i.id = o.item_id WHERE i.form_id = $1 ORDER BY o.id",
    )
    .bind(form_id)
    .fetch_all(pool)
    .await
}

/// Fails with RowNotFound when the target item is not part of the form.
pub async fn insert_option(
    conn: &mut PgConnection,
    form_id: i32,
    item_id: i32,
    title: Option<&str>,
) -> Result<ItemOption, sqlx::Error> {
    let query = format!(
        "INSERT INTO options (title, item_id) \
         SELECT $1, id FROM items WHERE id = $2 AND form_id = $3 RETURNING {}",
        OPTION_COLUMNS
    );
    sqlx::query_as::<_, ItemOption>(&query)
        .bind(title)
        .bind(item_id)
        .bind(form_id)
        .fetch_one(conn)
        .await
}

pub async fn delete_option(
    conn: &mut PgConnection,
    form_id: i32,
    option_id: i32,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM options o USING items i \
         WHERE o.id = $1 AND o.item_id = i.id AND i.form_id = $2",
    )
    .bind(option_id)
    .bind(form_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn update_option(
    conn: &mut PgConnection,
    form_id: i32,
    option_id: i32,
    title: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE options o SET title = COALESCE($1, o.title) FROM items i \
         WHERE o.id = $2 AND o.item_id = i.id AND i.form_id = $3",
    )
    .bind(title)
    .bind(option_id)
    .bind(form_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

// ---------------------------------------------------------------------------
// Aggregate loading and deep copy

/// Loads the form with its items (ordered) and their options.
pub async fn load_form_response(
    pool: &PgPool,
    form_id: i32,
) -> Result<Option<FormResponse>, sqlx::Error> {
    let Some(form) = find_form(pool, form_id).await? else {
        return Ok(None);
    };
    let items = list_items(pool, form_id).await?;
    let options = list_options_for_form(pool, form_id).await?;
    Ok(Some(assemble_form_response(form, items, options)))
}

pub fn assemble_form_response(
    form: Form,
    items: Vec<Item>,
    options: Vec<ItemOption>,
) -> FormResponse {
    let items = items
        .into_iter()
        .map(|item| {
            let options = options
                .iter()
                .filter(|o| o.item_id == item.id)
                .cloned()
                .collect();
            ItemResponse { item, options }
        })
        .collect();
    FormResponse { form, items }
}

/// Deep-copies the source form into a brand new ownership subtree: same
/// titles/types/orders/options, fresh ids, `is_template` and `to_review`
/// forced off, and a link derived from the new id.
pub async fn copy_form(
    pool: &PgPool,
    source_id: i32,
    new_owner: Uuid,
    frontend_base_url: &str,
) -> Result<Option<Form>, sqlx::Error> {
    let Some(source) = find_form(pool, source_id).await? else {
        return Ok(None);
    };
    let items = list_items(pool, source_id).await?;
    let options = list_options_for_form(pool, source_id).await?;

    let mut tx = pool.begin().await?;

    let query = format!(
        "INSERT INTO forms (title, description, is_template, organization, color, to_review, creator_id) \
         VALUES ($1, $2, FALSE, $3, $4, FALSE, $5) RETURNING {}",
        FORM_COLUMNS
    );
    let copy = sqlx::query_as::<_, Form>(&query)
        .bind(&source.title)
        .bind(&source.description)
        .bind(&source.organization)
        .bind(&source.color)
        .bind(new_owner)
        .fetch_one(&mut *tx)
        .await?;

    let link = format!("{}/forms/{}", frontend_base_url, copy.id);
    let copy = set_form_link(&mut tx, copy.id, &link).await?;

    for item in &items {
        let new_item = sqlx::query_as::<_, Item>(&format!(
            "INSERT INTO items (title, description, item_type, item_order, required, form_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            ITEM_COLUMNS
        ))
        .bind(&item.title)
        .bind(&item.description)
        .bind(item.item_type)
        .bind(item.item_order)
        .bind(item.required)
        .bind(copy.id)
        .fetch_one(&mut *tx)
        .await?;

        for option in options.iter().filter(|o| o.item_id == item.id) {
            sqlx::query("INSERT INTO options (title, item_id) VALUES ($1, $2)")
                .bind(&option.title)
                .bind(new_item.id)
                .execute(&mut *tx)
                .await?;
        }
    }

    tx.commit().await?;
    Ok(Some(copy))
}
