use axum::Router;

pub mod inventory;
pub mod photos;
pub mod system;

/// Router for every resource endpoint (health is mounted by the caller).
pub fn router(max_photo_bytes: usize) -> Router {
    Router::new()
        .nest("/inventory", inventory::router())
        .nest("/photos", photos::router(max_photo_bytes))
}
