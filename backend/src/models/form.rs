//! Models for forms, their items (questions), and item options (choices),
//! plus the batched mutation protocol applied by `PUT /api/forms/{id}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Question kinds. Wire values are preserved from the original frontend
/// contract, including the historical `multichoiseQuestion` spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, ToSchema, Default)]
#[sqlx(type_name = "TEXT")]
pub enum ItemType {
    #[default]
    #[sqlx(rename = "choiceQuestion")]
    ChoiceQuestion,
    #[sqlx(rename = "multichoiseQuestion")]
    MultichoiceQuestion,
    #[sqlx(rename = "textQuestion")]
    TextQuestion,
    #[sqlx(rename = "longTextQuestion")]
    LongTextQuestion,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::ChoiceQuestion => "choiceQuestion",
            ItemType::MultichoiceQuestion => "multichoiseQuestion",
            ItemType::TextQuestion => "textQuestion",
            ItemType::LongTextQuestion => "longTextQuestion",
        }
    }

    /// Choice-type items carry options; their answers reference option ids.
    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            ItemType::ChoiceQuestion | ItemType::MultichoiceQuestion
        )
    }
}

impl Serialize for ItemType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ItemType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "choiceQuestion" => Ok(ItemType::ChoiceQuestion),
            "multichoiseQuestion" => Ok(ItemType::MultichoiceQuestion),
            "textQuestion" => Ok(ItemType::TextQuestion),
            "longTextQuestion" => Ok(ItemType::LongTextQuestion),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &[
                    "choiceQuestion",
                    "multichoiseQuestion",
                    "textQuestion",
                    "longTextQuestion",
                ],
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Form {
    pub id: i32,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_template: bool,
    /// Organization tag (logo asset name in the original deployment).
    pub organization: String,
    /// Color tag shown in the form gallery.
    pub color: String,
    pub to_review: bool,
    pub created_at: DateTime<Utc>,
    /// Shareable link embedding the form id; set after insert.
    pub link: Option<String>,
    /// Nulled when the owning account is hard-removed from the database.
    pub creator_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Item {
    pub id: i32,
    pub title: Option<String>,
    pub description: Option<String>,
    pub item_type: ItemType,
    /// Dense rank within the form: always a permutation of 1..N at rest.
    pub item_order: i32,
    pub required: bool,
    pub form_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ItemOption {
    pub id: i32,
    pub title: Option<String>,
    pub item_id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemResponse {
    #[serde(flatten)]
    pub item: Item,
    pub options: Vec<ItemOption>,
}

/// Full form with items ordered by `item_order` ascending.
#[derive(Debug, Serialize, ToSchema)]
pub struct FormResponse {
    #[serde(flatten)]
    pub form: Form,
    pub items: Vec<ItemResponse>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListFormsQuery {
    /// When true, only templates are returned.
    #[serde(default)]
    pub is_template: Option<bool>,
    /// When true, only forms owned by the caller are returned.
    #[serde(default)]
    pub my: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct CreateFormQuery {
    /// Present: deep-copy the referenced form instead of creating empty.
    pub id: Option<i32>,
}

/// One batched edit applied to a form's item/option tree.
///
/// The list is ordered and heterogeneous; the whole batch commits or rolls
/// back as a unit. Field names accept the frontend's camelCase spellings.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FormOperation {
    /// Omitted fields are left untouched; the payload cannot distinguish
    /// "absent" from "set to null", so fields cannot be cleared here.
    UpdateForm {
        title: Option<String>,
        description: Option<String>,
        #[serde(default, alias = "isTemplate")]
        is_template: Option<bool>,
        organization: Option<String>,
        color: Option<String>,
    },
    CreateItem {
        #[serde(alias = "itemOrder")]
        item_order: i32,
        title: Option<String>,
        description: Option<String>,
        #[serde(default, alias = "itemType")]
        item_type: ItemType,
        #[serde(default)]
        required: bool,
    },
    MoveItem {
        #[serde(alias = "fromOrder")]
        from_order: i32,
        #[serde(alias = "toOrder")]
        to_order: i32,
    },
    DeleteItem {
        id: i32,
        /// Order the client believes the item is at; a mismatch means the
        /// client is stale and the delete is refused.
        #[serde(alias = "itemOrder")]
        item_order: i32,
    },
    /// Same partial-update contract as `updateForm`: omitted fields keep
    /// their value and cannot be nulled out.
    UpdateItem {
        id: i32,
        title: Option<String>,
        description: Option<String>,
        #[serde(default, alias = "itemType")]
        item_type: Option<ItemType>,
        required: Option<bool>,
    },
    CreateOption {
        #[serde(alias = "itemId")]
        item_id: i32,
        title: Option<String>,
    },
    DeleteOption {
        id: i32,
    },
    UpdateOption {
        id: i32,
        title: Option<String>,
    },
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FormBatchRequest {
    #[serde(default, alias = "includeFormInResponse")]
    pub include_form_in_response: bool,
    pub requests: Vec<FormOperation>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn item_type_serde_uses_original_wire_values() {
        let t: ItemType = serde_json::from_str("\"multichoiseQuestion\"").unwrap();
        assert_eq!(t, ItemType::MultichoiceQuestion);
        assert!(t.is_choice());

        let t: ItemType = serde_json::from_str("\"longTextQuestion\"").unwrap();
        assert!(!t.is_choice());

        assert_eq!(
            serde_json::to_value(ItemType::TextQuestion).unwrap(),
            json!("textQuestion")
        );
        assert!(serde_json::from_str::<ItemType>("\"multiChoiceQuestion\"").is_err());
    }

    #[test]
    fn batch_request_accepts_camel_case_payload() {
        let payload = json!({
            "includeFormInResponse": true,
            "requests": [
                {"type": "createItem", "itemOrder": 1, "title": "Q1", "itemType": "textQuestion"},
                {"type": "moveItem", "fromOrder": 2, "toOrder": 1},
                {"type": "deleteItem", "id": 7, "itemOrder": 2},
                {"type": "updateForm", "title": "Renamed"},
                {"type": "createOption", "itemId": 3, "title": "Yes"}
            ]
        });
        let batch: FormBatchRequest = serde_json::from_value(payload).unwrap();
        assert!(batch.include_form_in_response);
        assert_eq!(batch.requests.len(), 5);
        assert!(matches!(
            batch.requests[0],
            FormOperation::CreateItem {
                item_order: 1,
                item_type: ItemType::TextQuestion,
                required: false,
                ..
            }
        ));
        assert!(matches!(
            batch.requests[1],
            FormOperation::MoveItem {
                from_order: 2,
                to_order: 1
            }
        ));
    }

    #[test]
    fn batch_request_rejects_unknown_operation() {
        let payload = json!({
            "requests": [{"type": "explodeItem", "id": 1}]
        });
        assert!(serde_json::from_value::<FormBatchRequest>(payload).is_err());
    }
}
