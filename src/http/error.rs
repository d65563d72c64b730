//! JSON error responses.

use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use log::error;
use serde_json::json;

use crate::error::{EldenDataError, EldenDataResult};

impl ResponseError for EldenDataError {
    fn status_code(&self) -> StatusCode {
        match self {
            EldenDataError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            EldenDataError::NotFound(_) => StatusCode::NOT_FOUND,
            EldenDataError::InvalidIdentifier(_) | EldenDataError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            EldenDataError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        HttpResponse::build(status).json(json!({
            "error": self.kind(),
            "message": self.to_string(),
        }))
    }
}

/// Runs store-bound work on the blocking pool.
pub async fn blocking<F, T>(work: F) -> EldenDataResult<T>
where
    F: FnOnce() -> EldenDataResult<T> + Send + 'static,
    T: Send + 'static,
{
    web::block(work)
        .await
        .map_err(|e| EldenDataError::store_unavailable(format!("blocking task failed: {}", e)))?
}

/// Malformed JSON bodies answer with the same error shape as everything else.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req: &HttpRequest| {
        actix_web::Error::from(EldenDataError::bad_request(err.to_string()))
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req: &HttpRequest| {
        actix_web::Error::from(EldenDataError::bad_request(err.to_string()))
    })
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req: &HttpRequest| {
        actix_web::Error::from(EldenDataError::bad_request(err.to_string()))
    })
}
