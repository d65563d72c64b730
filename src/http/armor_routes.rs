//! Derived armor queries.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use super::resource::{crud_routes, with_repository, Armors};
use crate::context::AppContext;
use crate::error::EldenDataError;
use crate::service::armors::{self, OptimizationRequest};

fn default_ratio_limit() -> usize {
    10
}

#[derive(Debug, Deserialize)]
pub struct RatioQuery {
    #[serde(default = "default_ratio_limit")]
    pub limit: usize,
    pub slot: Option<String>,
}

pub async fn by_slot(
    context: web::Data<AppContext>,
    path: web::Path<String>,
) -> Result<HttpResponse, EldenDataError> {
    let slot = path.into_inner();
    let found = with_repository::<Armors, _, _>(&context, move |repo| armors::by_slot(&repo, &slot)).await?;
    Ok(HttpResponse::Ok().json(found))
}

pub async fn best_ratio(
    context: web::Data<AppContext>,
    query: web::Query<RatioQuery>,
) -> Result<HttpResponse, EldenDataError> {
    let RatioQuery { limit, slot } = query.into_inner();
    let ranked = with_repository::<Armors, _, _>(&context, move |repo| {
        armors::best_defense_to_weight(&repo, limit, slot.as_deref())
    })
    .await?;
    Ok(HttpResponse::Ok().json(ranked))
}

pub async fn sets(context: web::Data<AppContext>) -> Result<HttpResponse, EldenDataError> {
    let found = with_repository::<Armors, _, _>(&context, |repo| armors::find_sets(&repo)).await?;
    Ok(HttpResponse::Ok().json(found))
}

pub async fn optimize(
    context: web::Data<AppContext>,
    body: web::Json<OptimizationRequest>,
) -> Result<HttpResponse, EldenDataError> {
    let request = body.into_inner();
    let set = with_repository::<Armors, _, _>(&context, move |repo| armors::optimize_set(&repo, &request)).await?;
    Ok(HttpResponse::Ok().json(set))
}

pub async fn statistics(context: web::Data<AppContext>) -> Result<HttpResponse, EldenDataError> {
    let stats = with_repository::<Armors, _, _>(&context, |repo| armors::statistics(&repo)).await?;
    Ok(HttpResponse::Ok().json(stats))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/armors/slot/{slot}", web::get().to(by_slot))
        .route("/armors/best-ratio", web::get().to(best_ratio))
        .route("/armors/sets", web::get().to(sets))
        .route("/armors/optimize", web::post().to(optimize))
        .route("/armors/statistics", web::get().to(statistics));
    crud_routes::<Armors>(cfg, "/armors");
}
