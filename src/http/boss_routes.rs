//! Derived boss queries.

use actix_web::{web, HttpResponse};

use super::resource::{crud_routes, with_repository, Bosses};
use crate::context::AppContext;
use crate::error::EldenDataError;
use crate::service::bosses;

pub async fn by_region(
    context: web::Data<AppContext>,
    path: web::Path<String>,
) -> Result<HttpResponse, EldenDataError> {
    let region = path.into_inner();
    let found = with_repository::<Bosses, _, _>(&context, move |repo| bosses::by_region(&repo, &region)).await?;
    Ok(HttpResponse::Ok().json(found))
}

pub async fn by_drop(
    context: web::Data<AppContext>,
    path: web::Path<String>,
) -> Result<HttpResponse, EldenDataError> {
    let item = path.into_inner();
    let found = with_repository::<Bosses, _, _>(&context, move |repo| bosses::search_by_drop(&repo, &item)).await?;
    Ok(HttpResponse::Ok().json(found))
}

pub async fn grouped_by_region(context: web::Data<AppContext>) -> Result<HttpResponse, EldenDataError> {
    let groups = with_repository::<Bosses, _, _>(&context, |repo| bosses::grouped_by_region(&repo)).await?;
    Ok(HttpResponse::Ok().json(groups))
}

pub async fn grouped_by_tier(context: web::Data<AppContext>) -> Result<HttpResponse, EldenDataError> {
    let groups = with_repository::<Bosses, _, _>(&context, |repo| bosses::grouped_by_tier(&repo)).await?;
    Ok(HttpResponse::Ok().json(groups))
}

pub async fn drops(context: web::Data<AppContext>) -> Result<HttpResponse, EldenDataError> {
    let analysis = with_repository::<Bosses, _, _>(&context, |repo| bosses::drop_analysis(&repo)).await?;
    Ok(HttpResponse::Ok().json(analysis))
}

pub async fn shardbearers(context: web::Data<AppContext>) -> Result<HttpResponse, EldenDataError> {
    let analysis = with_repository::<Bosses, _, _>(&context, |repo| bosses::shardbearers(&repo)).await?;
    Ok(HttpResponse::Ok().json(analysis))
}

pub async fn statistics(context: web::Data<AppContext>) -> Result<HttpResponse, EldenDataError> {
    let stats = with_repository::<Bosses, _, _>(&context, |repo| bosses::statistics(&repo)).await?;
    Ok(HttpResponse::Ok().json(stats))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/bosses/region/{region}", web::get().to(by_region))
        .route("/bosses/drops/{item}", web::get().to(by_drop))
        .route("/bosses/grouped/region", web::get().to(grouped_by_region))
        .route("/bosses/grouped/tier", web::get().to(grouped_by_tier))
        .route("/bosses/drops", web::get().to(drops))
        .route("/bosses/shardbearers", web::get().to(shardbearers))
        .route("/bosses/statistics", web::get().to(statistics));
    crud_routes::<Bosses>(cfg, "/bosses");
}
