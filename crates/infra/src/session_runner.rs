//! Drives a [`SessionState`] by running the effects its transitions request.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::warn;

use stockroom_inventory::{Effect, SessionState, UiEvent};

use crate::document_store::DocumentStore;
use crate::object_store::ObjectStore;
use crate::service::{InventoryService, ServiceError};

/// One user session against a shared [`InventoryService`].
///
/// Effects of a transition run in order. Their results (refreshed lists,
/// stored photo URLs) are fed back as events. The first failing effect is
/// reported as [`UiEvent::OperationFailed`] and the rest of its batch is
/// dropped, so the cached list stays as it was.
#[derive(Debug)]
pub struct SessionRunner<S, O> {
    service: Arc<InventoryService<S, O>>,
    state: SessionState,
}

impl<S, O> SessionRunner<S, O>
where
    S: DocumentStore,
    O: ObjectStore,
{
    pub fn new(service: Arc<InventoryService<S, O>>) -> Self {
        Self {
            service,
            state: SessionState::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Load the initial item list.
    pub async fn start(&mut self) -> &SessionState {
        self.run(vec![Effect::Refresh]).await;
        &self.state
    }

    pub async fn dispatch(&mut self, event: UiEvent) -> &SessionState {
        let effects = self.apply(event);
        self.run(effects).await;
        &self.state
    }

    fn apply(&mut self, event: UiEvent) -> Vec<Effect> {
        let (next, effects) = std::mem::take(&mut self.state).transition(event);
        self.state = next;
        effects
    }

    async fn run(&mut self, effects: Vec<Effect>) {
        let mut queue: VecDeque<Effect> = effects.into();
        let mut follow_ups = Vec::new();

        while let Some(effect) = queue.pop_front() {
            match self.execute(effect).await {
                Ok(Some(event)) => follow_ups.push(event),
                Ok(None) => {}
                Err(err) => {
                    warn!("session effect failed: {err}");
                    queue.clear();
                    follow_ups.push(UiEvent::OperationFailed(err.to_string()));
                }
            }

            for event in follow_ups.drain(..) {
                queue.extend(self.apply(event));
            }
        }
    }

    async fn execute(&self, effect: Effect) -> Result<Option<UiEvent>, ServiceError> {
        match effect {
            Effect::Add(cmd) => self.service.add(cmd).await.map(|_| None),
            Effect::Edit(cmd) => self.service.edit(cmd).await.map(|_| None),
            Effect::Remove(name) => self.service.remove(&name).await.map(|_| None),
            Effect::UploadPhoto {
                bytes,
                content_type,
            } => {
                let upload = self.service.store_photo(bytes, &content_type).await?;
                Ok(Some(UiEvent::PhotoStored(upload.url)))
            }
            Effect::Refresh => {
                let items = self.service.list_all().await?;
                Ok(Some(UiEvent::Refreshed(items)))
            }
        }
    }
}
