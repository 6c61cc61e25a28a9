use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::error;

use stockroom_core::DomainError;
use stockroom_infra::ServiceError;
use stockroom_infra::document_store::StoreError;
use stockroom_infra::object_store::ObjectStoreError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::Store(e) => match e {
            StoreError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
            StoreError::InvalidWrite(msg) => {
                json_error(StatusCode::BAD_REQUEST, "invalid_write", msg)
            }
            StoreError::Unavailable(msg) => {
                error!(error = %msg, "document store unavailable");
                json_error(StatusCode::BAD_GATEWAY, "store_unavailable", msg)
            }
            StoreError::Corrupt(msg) => {
                error!(error = %msg, "corrupt stored document");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_corrupt", msg)
            }
        },
        ServiceError::Objects(e) => match e {
            ObjectStoreError::NotFound(key) => {
                json_error(StatusCode::NOT_FOUND, "not_found", format!("no object at {key}"))
            }
            ObjectStoreError::InvalidKey(msg) => {
                json_error(StatusCode::BAD_REQUEST, "invalid_key", msg)
            }
            ObjectStoreError::UnsupportedContentType(ct) => json_error(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "unsupported_content_type",
                format!("unsupported content type: {ct}"),
            ),
            ObjectStoreError::Unavailable(msg) => {
                error!(error = %msg, "object store unavailable");
                json_error(StatusCode::BAD_GATEWAY, "object_store_unavailable", msg)
            }
            ObjectStoreError::Io(e) => {
                error!(error = %e, "object store io failure");
                json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "object_store_io",
                    e.to_string(),
                )
            }
        },
        ServiceError::Conflict { attempts } => json_error(
            StatusCode::CONFLICT,
            "conflict",
            format!("item kept changing; gave up after {attempts} attempts"),
        ),
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let status = match &err {
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::InvariantViolation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
    };
    json_error(status, err.code(), err.detail())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_client_statuses() {
        let cases = [
            (DomainError::validation("x"), StatusCode::BAD_REQUEST),
            (DomainError::invariant("x"), StatusCode::UNPROCESSABLE_ENTITY),
            (DomainError::not_found("x"), StatusCode::NOT_FOUND),
            (DomainError::conflict("x"), StatusCode::CONFLICT),
        ];
        for (err, status) in cases {
            assert_eq!(domain_error_to_response(err).status(), status);
        }
    }

    #[test]
    fn exhausted_retries_are_conflicts() {
        let resp = service_error_to_response(ServiceError::Conflict { attempts: 5 });
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn unavailable_store_is_bad_gateway() {
        let resp =
            service_error_to_response(StoreError::Unavailable("down".to_string()).into());
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }
}
