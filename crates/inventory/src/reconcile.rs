//! Reconciliation rules: how add, remove and edit turn into store writes.
//!
//! Every rule is a pure planning function from the current [`Snapshot`] of an
//! item plus a command to a [`StoreWrite`]. The write carries the snapshot's
//! revision, so an executor can detect that the document moved underneath it
//! and re-plan instead of losing an update.

use stockroom_core::{DomainError, DomainResult};

use crate::document::{ItemPatch, Snapshot, StoreWrite, WriteMode};
use crate::item::{AddItem, EditItem, InventoryItem};

/// Plan an add.
///
/// An existing item accumulates quantity and takes the supplied category and
/// image (last write wins, so an add without an image clears it). A missing
/// item is created from the command.
pub fn plan_add(snapshot: &Snapshot, cmd: &AddItem) -> DomainResult<StoreWrite> {
    let quantity = cmd.quantity.ensure_positive()?;
    let expected = snapshot.expected_version();

    match snapshot.item() {
        Some(existing) => {
            let patch = ItemPatch::default()
                .category(cmd.category)
                .quantity(existing.quantity.checked_add(quantity)?)
                .image_url(cmd.image_url.clone());
            Ok(StoreWrite::Put {
                name: cmd.name.clone(),
                patch,
                mode: WriteMode::Merge,
                expected,
            })
        }
        None => {
            let item = InventoryItem {
                name: cmd.name.clone(),
                category: cmd.category,
                quantity,
                image_url: cmd.image_url.clone(),
            };
            Ok(StoreWrite::Put {
                name: cmd.name.clone(),
                patch: ItemPatch::full(&item),
                mode: WriteMode::Replace,
                expected,
            })
        }
    }
}

/// Plan a single-unit removal.
///
/// Absent items are a no-op. A quantity of 1 (or less) deletes the item in one
/// call; otherwise the quantity drops by exactly one and nothing else changes.
pub fn plan_remove(snapshot: &Snapshot) -> StoreWrite {
    let Some(existing) = snapshot.item() else {
        return StoreWrite::Noop;
    };
    let expected = snapshot.expected_version();

    if existing.quantity.get() <= 1 {
        StoreWrite::Delete {
            name: existing.name.clone(),
            expected,
        }
    } else {
        StoreWrite::Put {
            name: existing.name.clone(),
            patch: ItemPatch::default().quantity(existing.quantity.decremented()),
            mode: WriteMode::Merge,
            expected,
        }
    }
}

/// Plan an edit: overwrite category, quantity and image of an existing item.
///
/// Editing an item that does not exist is `NotFound`. Editing the quantity
/// down to zero deletes the item.
pub fn plan_edit(snapshot: &Snapshot, cmd: &EditItem) -> DomainResult<StoreWrite> {
    if snapshot.item().is_none() {
        return Err(DomainError::not_found(format!("item '{}'", cmd.name)));
    }
    let expected = snapshot.expected_version();

    if cmd.quantity.is_zero() {
        return Ok(StoreWrite::Delete {
            name: cmd.name.clone(),
            expected,
        });
    }

    Ok(StoreWrite::Put {
        name: cmd.name.clone(),
        patch: ItemPatch::default()
            .category(cmd.category)
            .quantity(cmd.quantity)
            .image_url(cmd.image_url.clone()),
        mode: WriteMode::Merge,
        expected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use stockroom_core::ExpectedVersion;

    use crate::category::Category;
    use crate::document::StoredItem;
    use crate::item::ItemName;
    use crate::quantity::Quantity;

    fn name(s: &str) -> ItemName {
        ItemName::new(s).unwrap()
    }

    fn found(item: InventoryItem, revision: u64) -> Snapshot {
        Snapshot::Found(StoredItem {
            item,
            revision,
            updated_at: Utc::now(),
        })
    }

    fn add(n: &str, category: Option<Category>, q: u32) -> AddItem {
        AddItem {
            name: name(n),
            category,
            quantity: Quantity::new(q),
            image_url: None,
        }
    }

    /// Apply a planned write to an in-test snapshot, the way a store would.
    fn execute(snapshot: &Snapshot, write: StoreWrite, revision: u64) -> Snapshot {
        match write {
            StoreWrite::Put {
                name, patch, mode, expected,
            } => {
                assert_eq!(expected, snapshot.expected_version());
                let item = patch.apply(&name, snapshot.item(), mode).unwrap();
                found(item, revision)
            }
            StoreWrite::Delete { expected, .. } => {
                assert_eq!(expected, snapshot.expected_version());
                Snapshot::Absent
            }
            StoreWrite::Noop => snapshot.clone(),
        }
    }

    #[test]
    fn add_creates_missing_item_as_create_only_write() {
        let write = plan_add(&Snapshot::Absent, &add("apple", Some(Category::Fruit), 3)).unwrap();
        match write {
            StoreWrite::Put { mode, expected, patch, .. } => {
                assert_eq!(mode, WriteMode::Replace);
                assert_eq!(expected, ExpectedVersion::ABSENT);
                assert_eq!(patch.quantity, Some(Quantity::new(3)));
            }
            other => panic!("unexpected write: {other:?}"),
        }
    }

    #[test]
    fn add_twice_accumulates_and_keeps_last_category() {
        let first = execute(
            &Snapshot::Absent,
            plan_add(&Snapshot::Absent, &add("apple", Some(Category::Fruit), 2)).unwrap(),
            1,
        );
        let second = execute(
            &first,
            plan_add(&first, &add("apple", Some(Category::Snack), 5)).unwrap(),
            2,
        );
        let item = second.item().unwrap();
        assert_eq!(item.quantity.get(), 7);
        assert_eq!(item.category, Some(Category::Snack));
    }

    #[test]
    fn add_replaces_image_with_supplied_value() {
        let existing = found(
            InventoryItem::new(name("apple"), None, Quantity::new(1)).with_image_url("u1"),
            4,
        );
        let next = execute(&existing, plan_add(&existing, &add("apple", None, 1)).unwrap(), 5);
        assert_eq!(next.item().unwrap().image_url, None);

        let mut with_image = add("apple", None, 1);
        with_image.image_url = Some("u2".to_string());
        let next = execute(&next, plan_add(&next, &with_image).unwrap(), 6);
        assert_eq!(next.item().unwrap().image_url.as_deref(), Some("u2"));
    }

    #[test]
    fn add_rejects_zero_quantity() {
        let err = plan_add(&Snapshot::Absent, &add("apple", None, 0)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn add_rejects_overflow() {
        let existing = found(InventoryItem::new(name("rice"), None, Quantity::new(u32::MAX)), 1);
        let err = plan_add(&existing, &add("rice", None, 1)).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn remove_of_absent_item_is_noop() {
        assert_eq!(plan_remove(&Snapshot::Absent), StoreWrite::Noop);
    }

    #[test]
    fn remove_at_quantity_one_deletes() {
        let snap = found(InventoryItem::new(name("milk"), Some(Category::Dairy), Quantity::ONE), 9);
        assert_eq!(
            plan_remove(&snap),
            StoreWrite::Delete {
                name: name("milk"),
                expected: ExpectedVersion::Exact(9),
            }
        );
    }

    #[test]
    fn remove_above_one_decrements_and_leaves_other_fields() {
        let snap = found(
            InventoryItem::new(name("milk"), Some(Category::Dairy), Quantity::new(4)).with_image_url("m"),
            2,
        );
        let next = execute(&snap, plan_remove(&snap), 3);
        let item = next.item().unwrap();
        assert_eq!(item.quantity.get(), 3);
        assert_eq!(item.category, Some(Category::Dairy));
        assert_eq!(item.image_url.as_deref(), Some("m"));
    }

    #[test]
    fn edit_of_missing_item_is_not_found() {
        let cmd = EditItem {
            name: name("ghost"),
            category: None,
            quantity: Quantity::new(1),
            image_url: None,
        };
        let err = plan_edit(&Snapshot::Absent, &cmd).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn edit_overwrites_every_field() {
        let snap = found(
            InventoryItem::new(name("bread"), Some(Category::Grain), Quantity::new(10)).with_image_url("b"),
            1,
        );
        let cmd = EditItem {
            name: name("bread"),
            category: Some(Category::Snack),
            quantity: Quantity::new(2),
            image_url: None,
        };
        let next = execute(&snap, plan_edit(&snap, &cmd).unwrap(), 2);
        assert_eq!(
            next.item().unwrap(),
            &InventoryItem::new(name("bread"), Some(Category::Snack), Quantity::new(2))
        );
    }

    #[test]
    fn edit_to_zero_deletes() {
        let snap = found(InventoryItem::new(name("bread"), None, Quantity::new(10)), 7);
        let cmd = EditItem {
            name: name("bread"),
            category: None,
            quantity: Quantity::ZERO,
            image_url: None,
        };
        assert!(matches!(plan_edit(&snap, &cmd).unwrap(), StoreWrite::Delete { .. }));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: consecutive adds sum their quantities.
            #[test]
            fn adds_accumulate(q1 in 1u32..100_000, q2 in 1u32..100_000) {
                let s1 = execute(&Snapshot::Absent, plan_add(&Snapshot::Absent, &add("x", None, q1)).unwrap(), 1);
                let s2 = execute(&s1, plan_add(&s1, &add("x", Some(Category::Other), q2)).unwrap(), 2);
                prop_assert_eq!(s2.item().unwrap().quantity.get(), q1 + q2);
                prop_assert_eq!(s2.item().unwrap().category, Some(Category::Other));
            }

            /// Property: n removals fully delete an item of quantity n, never going below one.
            #[test]
            fn removals_drain_to_absent(n in 1u32..50) {
                let mut snap = found(InventoryItem::new(name("x"), None, Quantity::new(n)), 1);
                for step in 0..n {
                    let remaining = snap.item().map(|i| i.quantity.get());
                    prop_assert_eq!(remaining, Some(n - step));
                    snap = execute(&snap, plan_remove(&snap), u64::from(step) + 2);
                }
                prop_assert_eq!(snap, Snapshot::Absent);
            }
        }
    }
}
