use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use stockroom_infra::Reconciled;
use stockroom_inventory::{Category, ItemName, Snapshot};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/items", get(list_items).post(add_item))
        .route("/items/:name", get(get_item).put(edit_item))
        .route("/items/:name/remove", post(remove_item))
        .route("/categories", get(list_categories))
}

fn parse_name(raw: String) -> Result<ItemName, axum::response::Response> {
    ItemName::new(raw).map_err(errors::domain_error_to_response)
}

fn outcome_response(outcome: &Reconciled) -> axum::response::Response {
    (StatusCode::OK, Json(dto::OutcomeResponse::from(outcome))).into_response()
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ListItemsQuery>,
) -> axum::response::Response {
    let query = match query.into_view_query() {
        Ok(q) => q,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.inventory.view(&query).await {
        Ok(items) => {
            let items: Vec<dto::ItemResponse> = items.iter().map(Into::into).collect();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
) -> axum::response::Response {
    let name = match parse_name(name) {
        Ok(n) => n,
        Err(resp) => return resp,
    };

    match services.inventory.get(&name).await {
        Ok(Snapshot::Found(stored)) => {
            (StatusCode::OK, Json(dto::ItemResponse::from(&stored))).into_response()
        }
        Ok(Snapshot::Absent) => errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("item {name} does not exist"),
        ),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn add_item(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::AddItemRequest>,
) -> axum::response::Response {
    let cmd = match body.into_command() {
        Ok(c) => c,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.inventory.add(cmd).await {
        Ok(outcome) => outcome_response(&outcome),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn edit_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
    Json(body): Json<dto::EditItemRequest>,
) -> axum::response::Response {
    let name = match parse_name(name) {
        Ok(n) => n,
        Err(resp) => return resp,
    };
    let cmd = match body.into_command(name) {
        Ok(c) => c,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.inventory.edit(cmd).await {
        Ok(outcome) => outcome_response(&outcome),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn remove_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
) -> axum::response::Response {
    let name = match parse_name(name) {
        Ok(n) => n,
        Err(resp) => return resp,
    };

    match services.inventory.remove(&name).await {
        Ok(outcome) => outcome_response(&outcome),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_categories() -> impl IntoResponse {
    Json(
        Category::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>(),
    )
}
