//! Derived class queries.

use actix_web::{web, HttpResponse};

use super::resource::{crud_routes, with_repository, Classes};
use crate::context::AppContext;
use crate::error::EldenDataError;
use crate::service::classes::{self, ClassComparisonRequest};

pub async fn by_archetype(
    context: web::Data<AppContext>,
    path: web::Path<String>,
) -> Result<HttpResponse, EldenDataError> {
    let archetype = path.into_inner();
    let found =
        with_repository::<Classes, _, _>(&context, move |repo| classes::by_archetype(&repo, &archetype)).await?;
    Ok(HttpResponse::Ok().json(found))
}

pub async fn compare(
    context: web::Data<AppContext>,
    body: web::Json<ClassComparisonRequest>,
) -> Result<HttpResponse, EldenDataError> {
    let request = body.into_inner();
    let comparison =
        with_repository::<Classes, _, _>(&context, move |repo| classes::compare(&repo, &request)).await?;
    Ok(HttpResponse::Ok().json(comparison))
}

pub async fn best_for_build(
    context: web::Data<AppContext>,
    path: web::Path<String>,
) -> Result<HttpResponse, EldenDataError> {
    let build_type = path.into_inner();
    let advice = with_repository::<Classes, _, _>(&context, move |repo| {
        classes::best_starting_class(&repo, &build_type)
    })
    .await?;
    Ok(HttpResponse::Ok().json(advice))
}

pub async fn distribution(context: web::Data<AppContext>) -> Result<HttpResponse, EldenDataError> {
    let distribution = with_repository::<Classes, _, _>(&context, |repo| classes::stat_distribution(&repo)).await?;
    Ok(HttpResponse::Ok().json(distribution))
}

pub async fn build_recommendation(
    context: web::Data<AppContext>,
    path: web::Path<String>,
) -> Result<HttpResponse, EldenDataError> {
    let id = path.into_inner();
    let recommendation = with_repository::<Classes, _, _>(&context, move |repo| {
        classes::build_recommendation(&repo, &id)
    })
    .await?;
    Ok(HttpResponse::Ok().json(recommendation))
}

pub async fn statistics(context: web::Data<AppContext>) -> Result<HttpResponse, EldenDataError> {
    let stats = with_repository::<Classes, _, _>(&context, |repo| classes::statistics(&repo)).await?;
    Ok(HttpResponse::Ok().json(stats))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/classes/archetype/{archetype}", web::get().to(by_archetype))
        .route("/classes/compare", web::post().to(compare))
        .route("/classes/best/{build_type}", web::get().to(best_for_build))
        .route("/classes/distribution", web::get().to(distribution))
        .route("/classes/statistics", web::get().to(statistics))
        .route("/classes/{id}/build", web::get().to(build_recommendation));
    crud_routes::<Classes>(cfg, "/classes");
}
