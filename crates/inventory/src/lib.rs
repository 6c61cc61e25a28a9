//! Inventory domain module.
//!
//! This crate contains the reconciliation rules for inventory items (how add,
//! remove and edit mutate quantities and merge against existing records), the
//! derived search view, and the session state machine that drives them. It is
//! deterministic domain logic only (no IO, no HTTP, no storage).

pub mod category;
pub mod document;
pub mod item;
pub mod quantity;
pub mod reconcile;
pub mod session;
pub mod view;

pub use category::{Category, CategoryFilter};
pub use document::{ItemPatch, Snapshot, StoreWrite, StoredItem, WriteMode};
pub use item::{AddItem, EditItem, InventoryItem, ItemName};
pub use quantity::Quantity;
pub use reconcile::{plan_add, plan_edit, plan_remove};
pub use session::{Effect, ItemForm, Modal, SessionState, UiEvent};
pub use view::{ViewQuery, derive_view};
