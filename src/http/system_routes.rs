//! Service info and health checks.

use actix_web::{web, HttpResponse};
use serde_json::json;

use super::error::blocking;
use crate::context::AppContext;
use crate::error::EldenDataError;

pub async fn index(context: web::Data<AppContext>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": "Elden Ring data API",
        "version": env!("CARGO_PKG_VERSION"),
        "health": "/health",
        "api": context.config().api_prefix,
        "status": "operational"
    }))
}

/// Pings the store and lists its collections; an unreachable store answers 503.
pub async fn health(context: web::Data<AppContext>) -> Result<HttpResponse, EldenDataError> {
    let ctx = context.clone();
    let collections = blocking(move || {
        ctx.store().ping()?;
        ctx.store().list_collections()
    })
    .await?;
    Ok(HttpResponse::Ok().json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": context.config().environment,
        "database": {
            "status": "healthy",
            "collections": collections,
        }
    })))
}

pub async fn api_health() -> HttpResponse {
    HttpResponse::Ok().json(json!({"status": "healthy"}))
}
