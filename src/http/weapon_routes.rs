//! Derived weapon queries.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use super::resource::{crud_routes, with_repository, Weapons};
use crate::context::AppContext;
use crate::error::EldenDataError;
use crate::service::weapons;

fn default_ratio_limit() -> usize {
    10
}

#[derive(Debug, Deserialize)]
pub struct RatioQuery {
    #[serde(default = "default_ratio_limit")]
    pub limit: usize,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub weapon_ids: Vec<String>,
}

pub async fn best_ratio(
    context: web::Data<AppContext>,
    query: web::Query<RatioQuery>,
) -> Result<HttpResponse, EldenDataError> {
    let RatioQuery { limit, category } = query.into_inner();
    let ranked = with_repository::<Weapons, _, _>(&context, move |repo| {
        weapons::best_damage_to_weight(&repo, limit, category.as_deref())
    })
    .await?;
    Ok(HttpResponse::Ok().json(ranked))
}

pub async fn by_category(
    context: web::Data<AppContext>,
    path: web::Path<String>,
) -> Result<HttpResponse, EldenDataError> {
    let category = path.into_inner();
    let found =
        with_repository::<Weapons, _, _>(&context, move |repo| weapons::by_category(&repo, &category)).await?;
    Ok(HttpResponse::Ok().json(found))
}

pub async fn by_build_type(
    context: web::Data<AppContext>,
    path: web::Path<String>,
) -> Result<HttpResponse, EldenDataError> {
    let build_type = path.into_inner();
    let found =
        with_repository::<Weapons, _, _>(&context, move |repo| weapons::by_build_type(&repo, &build_type)).await?;
    Ok(HttpResponse::Ok().json(found))
}

pub async fn compare(
    context: web::Data<AppContext>,
    body: web::Json<CompareRequest>,
) -> Result<HttpResponse, EldenDataError> {
    let ids = body.into_inner().weapon_ids;
    let comparison = with_repository::<Weapons, _, _>(&context, move |repo| weapons::compare(&repo, &ids)).await?;
    Ok(HttpResponse::Ok().json(comparison))
}

pub async fn statistics(context: web::Data<AppContext>) -> Result<HttpResponse, EldenDataError> {
    let stats = with_repository::<Weapons, _, _>(&context, |repo| weapons::statistics(&repo)).await?;
    Ok(HttpResponse::Ok().json(stats))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/weapons/best-ratio", web::get().to(best_ratio))
        .route("/weapons/category/{category}", web::get().to(by_category))
        .route("/weapons/build/{build_type}", web::get().to(by_build_type))
        .route("/weapons/compare", web::post().to(compare))
        .route("/weapons/statistics", web::get().to(statistics));
    crud_routes::<Weapons>(cfg, "/weapons");
}
