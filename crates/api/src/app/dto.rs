use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::DomainResult;
use stockroom_infra::{PhotoUpload, Reconciled};
use stockroom_inventory::{
    AddItem, Category, CategoryFilter, EditItem, InventoryItem, ItemName, Quantity, StoredItem,
    ViewQuery,
};

// -------------------------
// Request DTOs
// -------------------------

/// Quantities arrive either as JSON numbers or as form text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum QuantityInput {
    Number(f64),
    Text(String),
}

impl QuantityInput {
    fn coerce(&self) -> DomainResult<Quantity> {
        match self {
            QuantityInput::Number(n) => Quantity::from_number(*n),
            QuantityInput::Text(s) => Quantity::parse(s),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    pub quantity: QuantityInput,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl AddItemRequest {
    pub fn into_command(self) -> DomainResult<AddItem> {
        Ok(AddItem {
            name: ItemName::new(self.name)?,
            category: parse_category(self.category.as_deref())?,
            quantity: self.quantity.coerce()?.ensure_positive()?,
            image_url: non_blank(self.image_url),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct EditItemRequest {
    #[serde(default)]
    pub category: Option<String>,
    pub quantity: QuantityInput,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl EditItemRequest {
    pub fn into_command(self, name: ItemName) -> DomainResult<EditItem> {
        Ok(EditItem {
            name,
            category: parse_category(self.category.as_deref())?,
            quantity: self.quantity.coerce()?,
            image_url: non_blank(self.image_url),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListItemsQuery {
    #[serde(default)]
    pub search: Option<String>,
    /// Empty or absent means every category.
    #[serde(default)]
    pub category: Option<String>,
}

impl ListItemsQuery {
    pub fn into_view_query(self) -> DomainResult<ViewQuery> {
        let filter = CategoryFilter::from(parse_category(self.category.as_deref())?);
        Ok(ViewQuery::new(self.search.unwrap_or_default(), filter))
    }
}

fn parse_category(raw: Option<&str>) -> DomainResult<Option<Category>> {
    raw.map(Category::parse_optional).transpose().map(Option::flatten)
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub name: String,
    pub label: String,
    pub category: Option<Category>,
    pub quantity: u32,
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&InventoryItem> for ItemResponse {
    fn from(item: &InventoryItem) -> Self {
        Self {
            name: item.name.as_str().to_string(),
            label: item.name.display_label(),
            category: item.category,
            quantity: item.quantity.get(),
            image_url: item.image_url.clone(),
            revision: None,
            updated_at: None,
        }
    }
}

impl From<&StoredItem> for ItemResponse {
    fn from(stored: &StoredItem) -> Self {
        Self {
            revision: Some(stored.revision),
            updated_at: Some(stored.updated_at),
            ..ItemResponse::from(&stored.item)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OutcomeResponse {
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<ItemResponse>,
}

impl From<&Reconciled> for OutcomeResponse {
    fn from(outcome: &Reconciled) -> Self {
        match outcome {
            Reconciled::Stored(stored) => Self {
                outcome: "stored",
                item: Some(stored.into()),
            },
            Reconciled::Removed => Self {
                outcome: "deleted",
                item: None,
            },
            Reconciled::Unchanged => Self {
                outcome: "unchanged",
                item: None,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PhotoResponse {
    pub key: String,
    pub url: String,
}

impl From<PhotoUpload> for PhotoResponse {
    fn from(upload: PhotoUpload) -> Self {
        Self {
            key: upload.key,
            url: upload.url,
        }
    }
}
