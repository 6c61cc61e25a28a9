use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Extension, Path},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use stockroom_infra::ServiceError;
use stockroom_infra::object_store::ObjectStore;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router(max_photo_bytes: usize) -> Router {
    Router::new()
        .route("/", post(upload_photo))
        .route("/:file", get(fetch_photo))
        .layer(DefaultBodyLimit::max(max_photo_bytes))
}

pub async fn upload_photo(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    body: Bytes,
) -> axum::response::Response {
    let content_type = match headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    {
        Some(ct) => ct.to_string(),
        None => {
            return errors::json_error(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "missing_content_type",
                "photo uploads need a Content-Type header",
            );
        }
    };

    match services.inventory.store_photo(body.to_vec(), &content_type).await {
        Ok(upload) => (StatusCode::CREATED, Json(dto::PhotoResponse::from(upload))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn fetch_photo(
    Extension(services): Extension<Arc<AppServices>>,
    Path(file): Path<String>,
) -> axum::response::Response {
    let key = format!("photos/{file}");
    match services.inventory.objects().fetch(&key).await {
        Ok(object) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, object.content_type)],
            object.bytes,
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(ServiceError::Objects(e)),
    }
}
