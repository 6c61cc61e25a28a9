//! Document-store vocabulary shared by the reconciler and store adapters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, ExpectedVersion};

use crate::category::Category;
use crate::item::{InventoryItem, ItemName};
use crate::quantity::Quantity;

/// A document as persisted, with store-assigned metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredItem {
    pub item: InventoryItem,
    /// Store-wide monotonically increasing revision; never reused, never `0`.
    pub revision: u64,
    pub updated_at: DateTime<Utc>,
}

/// Result of a point read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snapshot {
    Found(StoredItem),
    Absent,
}

impl Snapshot {
    /// Revision a write planned from this snapshot must expect.
    pub fn revision(&self) -> u64 {
        match self {
            Snapshot::Found(stored) => stored.revision,
            Snapshot::Absent => 0,
        }
    }

    pub fn expected_version(&self) -> ExpectedVersion {
        ExpectedVersion::Exact(self.revision())
    }

    pub fn item(&self) -> Option<&InventoryItem> {
        match self {
            Snapshot::Found(stored) => Some(&stored.item),
            Snapshot::Absent => None,
        }
    }

    pub fn into_item(self) -> Option<InventoryItem> {
        match self {
            Snapshot::Found(stored) => Some(stored.item),
            Snapshot::Absent => None,
        }
    }
}

impl From<Option<StoredItem>> for Snapshot {
    fn from(value: Option<StoredItem>) -> Self {
        value.map_or(Snapshot::Absent, Snapshot::Found)
    }
}

/// How a put combines with an existing document.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteMode {
    /// Only keys present in the patch are overwritten.
    Merge,
    /// The document is replaced wholesale; keys missing from the patch are cleared.
    Replace,
}

/// Field-level write. `None` means "key not supplied"; for the optional
/// fields, `Some(None)` clears the key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPatch {
    pub category: Option<Option<Category>>,
    pub quantity: Option<Quantity>,
    pub image_url: Option<Option<String>>,
}

impl ItemPatch {
    /// Patch carrying every field of `item`.
    pub fn full(item: &InventoryItem) -> Self {
        Self {
            category: Some(item.category),
            quantity: Some(item.quantity),
            image_url: Some(item.image_url.clone()),
        }
    }

    pub fn category(mut self, category: Option<Category>) -> Self {
        self.category = Some(category);
        self
    }

    pub fn quantity(mut self, quantity: Quantity) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn image_url(mut self, image_url: Option<String>) -> Self {
        self.image_url = Some(image_url);
        self
    }

    /// Compute the document that results from writing this patch over
    /// `existing` (if any).
    pub fn apply(
        &self,
        name: &ItemName,
        existing: Option<&InventoryItem>,
        mode: WriteMode,
    ) -> DomainResult<InventoryItem> {
        let base = match mode {
            WriteMode::Merge => existing,
            WriteMode::Replace => None,
        };

        let quantity = self
            .quantity
            .or(base.map(|i| i.quantity))
            .ok_or_else(|| DomainError::validation(format!("write leaves '{name}' without a quantity")))?;
        if quantity.is_zero() {
            return Err(DomainError::invariant("stored items must have a positive quantity"));
        }

        let category = match self.category {
            Some(c) => c,
            None => base.and_then(|i| i.category),
        };
        let image_url = match &self.image_url {
            Some(u) => u.clone(),
            None => base.and_then(|i| i.image_url.clone()),
        };

        Ok(InventoryItem {
            name: name.clone(),
            category,
            quantity,
            image_url,
        })
    }
}

/// A planned store mutation, carrying the revision it was planned against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreWrite {
    Put {
        name: ItemName,
        patch: ItemPatch,
        mode: WriteMode,
        expected: ExpectedVersion,
    },
    Delete {
        name: ItemName,
        expected: ExpectedVersion,
    },
    Noop,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> ItemName {
        ItemName::new(s).unwrap()
    }

    fn apple() -> InventoryItem {
        InventoryItem::new(name("apple"), Some(Category::Fruit), Quantity::new(3))
            .with_image_url("https://img/apple.jpg")
    }

    #[test]
    fn merge_keeps_unsupplied_keys() {
        let patch = ItemPatch::default().quantity(Quantity::new(2));
        let out = patch.apply(&name("apple"), Some(&apple()), WriteMode::Merge).unwrap();
        assert_eq!(out.quantity.get(), 2);
        assert_eq!(out.category, Some(Category::Fruit));
        assert_eq!(out.image_url.as_deref(), Some("https://img/apple.jpg"));
    }

    #[test]
    fn merge_can_clear_optional_keys() {
        let patch = ItemPatch::default().category(None).image_url(None);
        let out = patch.apply(&name("apple"), Some(&apple()), WriteMode::Merge).unwrap();
        assert_eq!(out.category, None);
        assert_eq!(out.image_url, None);
        assert_eq!(out.quantity.get(), 3);
    }

    #[test]
    fn replace_drops_unsupplied_keys() {
        let patch = ItemPatch::default().quantity(Quantity::new(5));
        let out = patch.apply(&name("apple"), Some(&apple()), WriteMode::Replace).unwrap();
        assert_eq!(out, InventoryItem::new(name("apple"), None, Quantity::new(5)));
    }

    #[test]
    fn write_without_quantity_on_missing_document_is_rejected() {
        let patch = ItemPatch::default().category(Some(Category::Dairy));
        let err = patch.apply(&name("milk"), None, WriteMode::Merge).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn zero_quantity_documents_are_rejected() {
        let patch = ItemPatch::default().quantity(Quantity::ZERO);
        let err = patch.apply(&name("apple"), Some(&apple()), WriteMode::Merge).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn absent_snapshot_expects_revision_zero() {
        assert_eq!(Snapshot::Absent.expected_version(), ExpectedVersion::ABSENT);
        assert_eq!(Snapshot::from(None), Snapshot::Absent);
    }
}
