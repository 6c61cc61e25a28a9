//! Session state machine behind an inventory screen.
//!
//! The whole UI state (cached list, search inputs, the add/edit modal and its
//! form) lives in [`SessionState`]. [`SessionState::transition`] is a pure
//! function from `(state, event)` to the next state plus the store
//! [`Effect`]s the caller must run; results come back in as further events.

use serde::{Deserialize, Serialize};

use stockroom_core::{DomainResult, Entity};

use crate::category::{Category, CategoryFilter};
use crate::item::{AddItem, EditItem, InventoryItem, ItemName};
use crate::quantity::Quantity;
use crate::view::{ViewQuery, derive_view};

/// Add/edit modal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modal {
    #[default]
    Closed,
    Adding,
    Editing { name: ItemName },
}

impl Modal {
    pub fn is_open(&self) -> bool {
        !matches!(self, Modal::Closed)
    }
}

/// Raw form fields, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemForm {
    pub name: String,
    pub category: Option<Category>,
    pub quantity: String,
    pub image_url: Option<String>,
}

impl ItemForm {
    fn from_item(item: &InventoryItem) -> Self {
        Self {
            name: item.name.as_str().to_string(),
            category: item.category,
            quantity: item.quantity.to_string(),
            image_url: item.image_url.clone(),
        }
    }

    pub fn to_add(&self) -> DomainResult<AddItem> {
        Ok(AddItem {
            name: ItemName::new(self.name.clone())?,
            category: self.category,
            quantity: Quantity::parse_positive(&self.quantity)?,
            image_url: self.image_url.clone(),
        })
    }

    pub fn to_edit(&self, name: &ItemName) -> DomainResult<EditItem> {
        Ok(EditItem {
            name: name.clone(),
            category: self.category,
            quantity: Quantity::parse(&self.quantity)?,
            image_url: self.image_url.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiEvent {
    OpenAdd,
    OpenEdit(ItemName),
    Cancel,
    SetName(String),
    SetCategory(Option<Category>),
    SetQuantity(String),
    SetSearch(String),
    SetCategoryFilter(CategoryFilter),
    Submit,
    Remove(ItemName),
    PhotoCaptured { bytes: Vec<u8>, content_type: String },
    PhotoStored(String),
    Refreshed(Vec<InventoryItem>),
    OperationFailed(String),
}

/// Store work requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Add(AddItem),
    Edit(EditItem),
    Remove(ItemName),
    UploadPhoto { bytes: Vec<u8>, content_type: String },
    Refresh,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    items: Vec<InventoryItem>,
    query: ViewQuery,
    modal: Modal,
    form: ItemForm,
    last_error: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn query(&self) -> &ViewQuery {
        &self.query
    }

    pub fn modal(&self) -> &Modal {
        &self.modal
    }

    pub fn form(&self) -> &ItemForm {
        &self.form
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The list to display: cached items through the derived view.
    pub fn visible_items(&self) -> Vec<InventoryItem> {
        derive_view(&self.items, &self.query)
    }

    /// Whether a submit would currently be accepted.
    pub fn can_submit(&self) -> bool {
        self.submission().is_some_and(|r| r.is_ok())
    }

    fn submission(&self) -> Option<DomainResult<Effect>> {
        match &self.modal {
            Modal::Closed => None,
            Modal::Adding => Some(self.form.to_add().map(Effect::Add)),
            Modal::Editing { name } => Some(self.form.to_edit(name).map(Effect::Edit)),
        }
    }

    fn close_modal(&mut self) {
        self.modal = Modal::Closed;
        self.form = ItemForm::default();
    }

    pub fn transition(mut self, event: UiEvent) -> (Self, Vec<Effect>) {
        let mut effects = Vec::new();

        match event {
            UiEvent::OpenAdd => {
                self.modal = Modal::Adding;
                self.form = ItemForm::default();
            }
            UiEvent::OpenEdit(name) => {
                if let Some(item) = self.items.iter().find(|i| i.id() == &name) {
                    self.form = ItemForm::from_item(item);
                    self.modal = Modal::Editing { name };
                }
            }
            UiEvent::Cancel => self.close_modal(),
            UiEvent::SetName(name) => {
                if self.modal == Modal::Adding {
                    self.form.name = name;
                }
            }
            UiEvent::SetCategory(category) => self.form.category = category,
            UiEvent::SetQuantity(quantity) => self.form.quantity = quantity,
            UiEvent::SetSearch(search) => self.query.search = search,
            UiEvent::SetCategoryFilter(filter) => self.query.category = filter,
            UiEvent::Submit => match self.submission() {
                None => {}
                Some(Ok(effect)) => {
                    self.close_modal();
                    self.last_error = None;
                    effects.push(effect);
                    effects.push(Effect::Refresh);
                }
                Some(Err(err)) => self.last_error = Some(err.to_string()),
            },
            UiEvent::Remove(name) => {
                effects.push(Effect::Remove(name));
                effects.push(Effect::Refresh);
            }
            UiEvent::PhotoCaptured {
                bytes,
                content_type,
            } => {
                if self.modal.is_open() {
                    effects.push(Effect::UploadPhoto {
                        bytes,
                        content_type,
                    });
                }
            }
            UiEvent::PhotoStored(url) => {
                if self.modal.is_open() {
                    self.form.image_url = Some(url);
                }
            }
            UiEvent::Refreshed(items) => {
                self.items = items;
                self.last_error = None;
            }
            UiEvent::OperationFailed(msg) => self.last_error = Some(msg),
        }

        (self, effects)
    }
}
