use core::fmt;

use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, ValueObject};

use crate::category::Category;
use crate::quantity::Quantity;

/// Item name: the unique key of an inventory item and its display label.
///
/// Stored case-preserved; lookups by key are exact, search matching is
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemName(String);

impl ValueObject for ItemName {}

impl ItemName {
    pub fn new(name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name with its first character upper-cased, for list display.
    pub fn display_label(&self) -> String {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl TryFrom<String> for ItemName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ItemName> for String {
    fn from(value: ItemName) -> Self {
        value.0
    }
}

impl fmt::Display for ItemName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An inventory record as held in the document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub name: ItemName,
    pub category: Option<Category>,
    pub quantity: Quantity,
    pub image_url: Option<String>,
}

impl Entity for InventoryItem {
    type Id = ItemName;

    fn id(&self) -> &Self::Id {
        &self.name
    }
}

impl InventoryItem {
    pub fn new(name: ItemName, category: Option<Category>, quantity: Quantity) -> Self {
        Self {
            name,
            category,
            quantity,
            image_url: None,
        }
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }
}

/// Command: add units of an item, creating it on first add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItem {
    pub name: ItemName,
    pub category: Option<Category>,
    pub quantity: Quantity,
    pub image_url: Option<String>,
}

/// Command: overwrite an existing item's fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditItem {
    pub name: ItemName,
    pub category: Option<Category>,
    pub quantity: Quantity,
    pub image_url: Option<String>,
}
