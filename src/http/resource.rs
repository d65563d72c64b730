//! CRUD handlers shared by every entity collection.

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use super::error::blocking;
use crate::context::AppContext;
use crate::error::{EldenDataError, EldenDataResult};
use crate::models::{Armor, Boss, CharacterClass, Entity, Spell, Weapon};
use crate::service::armors::ArmorFilter;
use crate::service::bosses::BossFilter;
use crate::service::classes::{self, ClassFilter};
use crate::service::spells::SpellFilter;
use crate::service::weapons::WeaponFilter;
use crate::service::{Page, Pagination, Repository};
use crate::store::Document;

/// A collection exposed over HTTP.
pub trait Resource: 'static {
    type Entity: Entity;
    /// Filter parameters read from the list query string.
    type Query: DeserializeOwned + Send + 'static;

    fn repository(context: &AppContext) -> EldenDataResult<Repository<Self::Entity>>;

    fn list(
        repo: &Repository<Self::Entity>,
        query: &Self::Query,
        pagination: &Pagination,
    ) -> EldenDataResult<Page<Self::Entity>>;
}

pub struct Weapons;
pub struct Armors;
pub struct Bosses;
pub struct Classes;
pub struct Sorceries;
pub struct Incantations;

impl Resource for Weapons {
    type Entity = Weapon;
    type Query = WeaponFilter;

    fn repository(context: &AppContext) -> EldenDataResult<Repository<Weapon>> {
        context.weapons()
    }

    fn list(repo: &Repository<Weapon>, query: &WeaponFilter, pagination: &Pagination) -> EldenDataResult<Page<Weapon>> {
        repo.list(&query.to_filter()?, pagination)
    }
}

impl Resource for Armors {
    type Entity = Armor;
    type Query = ArmorFilter;

    fn repository(context: &AppContext) -> EldenDataResult<Repository<Armor>> {
        context.armors()
    }

    fn list(repo: &Repository<Armor>, query: &ArmorFilter, pagination: &Pagination) -> EldenDataResult<Page<Armor>> {
        repo.list(&query.to_filter()?, pagination)
    }
}

impl Resource for Bosses {
    type Entity = Boss;
    type Query = BossFilter;

    fn repository(context: &AppContext) -> EldenDataResult<Repository<Boss>> {
        context.bosses()
    }

    fn list(repo: &Repository<Boss>, query: &BossFilter, pagination: &Pagination) -> EldenDataResult<Page<Boss>> {
        repo.list(&query.to_filter()?, pagination)
    }
}

impl Resource for Classes {
    type Entity = CharacterClass;
    type Query = ClassFilter;

    fn repository(context: &AppContext) -> EldenDataResult<Repository<CharacterClass>> {
        context.classes()
    }

    fn list(
        repo: &Repository<CharacterClass>,
        query: &ClassFilter,
        pagination: &Pagination,
    ) -> EldenDataResult<Page<CharacterClass>> {
        classes::list(repo, query, pagination)
    }
}

impl Resource for Sorceries {
    type Entity = Spell;
    type Query = SpellFilter;

    fn repository(context: &AppContext) -> EldenDataResult<Repository<Spell>> {
        context.sorceries()
    }

    fn list(repo: &Repository<Spell>, query: &SpellFilter, pagination: &Pagination) -> EldenDataResult<Page<Spell>> {
        repo.list(&query.to_filter()?, pagination)
    }
}

impl Resource for Incantations {
    type Entity = Spell;
    type Query = SpellFilter;

    fn repository(context: &AppContext) -> EldenDataResult<Repository<Spell>> {
        context.incantations()
    }

    fn list(repo: &Repository<Spell>, query: &SpellFilter, pagination: &Pagination) -> EldenDataResult<Page<Spell>> {
        repo.list(&query.to_filter()?, pagination)
    }
}

/// Paging parameters; a missing limit falls back to the configured page size.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub skip: Option<usize>,
    pub limit: Option<usize>,
    pub sort_by: Option<String>,
    pub sort_order: Option<i32>,
}

impl ListQuery {
    pub fn into_pagination(self, default_limit: usize) -> Pagination {
        let defaults = Pagination::default();
        Pagination {
            skip: self.skip.unwrap_or(defaults.skip),
            limit: self.limit.unwrap_or(default_limit),
            sort_by: self.sort_by,
            sort_order: self.sort_order.unwrap_or(defaults.sort_order),
        }
    }
}

/// Runs `work` against the resource's repository on the blocking pool.
pub(crate) async fn with_repository<R, F, T>(context: &web::Data<AppContext>, work: F) -> EldenDataResult<T>
where
    R: Resource,
    F: FnOnce(Repository<R::Entity>) -> EldenDataResult<T> + Send + 'static,
    T: Send + 'static,
{
    let context = context.clone();
    blocking(move || work(R::repository(&context)?)).await
}

pub async fn list<R: Resource>(
    context: web::Data<AppContext>,
    paging: web::Query<ListQuery>,
    query: web::Query<R::Query>,
) -> Result<HttpResponse, EldenDataError> {
    let pagination = paging.into_inner().into_pagination(context.config().default_page_size);
    let query = query.into_inner();
    let page = with_repository::<R, _, _>(&context, move |repo| R::list(&repo, &query, &pagination)).await?;
    Ok(HttpResponse::Ok().json(page))
}

pub async fn get<R: Resource>(
    context: web::Data<AppContext>,
    path: web::Path<String>,
) -> Result<HttpResponse, EldenDataError> {
    let id = path.into_inner();
    let entity = with_repository::<R, _, _>(&context, move |repo| repo.get_by_id(&id)).await?;
    Ok(HttpResponse::Ok().json(entity))
}

pub async fn create<R: Resource>(
    context: web::Data<AppContext>,
    body: web::Json<Document>,
) -> Result<HttpResponse, EldenDataError> {
    let payload = body.into_inner();
    let entity = with_repository::<R, _, _>(&context, move |repo| repo.create(payload)).await?;
    Ok(HttpResponse::Created().json(entity))
}

pub async fn update<R: Resource>(
    context: web::Data<AppContext>,
    path: web::Path<String>,
    body: web::Json<Document>,
) -> Result<HttpResponse, EldenDataError> {
    let id = path.into_inner();
    let partial = body.into_inner();
    let entity = with_repository::<R, _, _>(&context, move |repo| repo.update(&id, partial)).await?;
    Ok(HttpResponse::Ok().json(entity))
}

pub async fn delete<R: Resource>(
    context: web::Data<AppContext>,
    path: web::Path<String>,
) -> Result<HttpResponse, EldenDataError> {
    let id = path.into_inner();
    let deleted = id.clone();
    with_repository::<R, _, _>(&context, move |repo| repo.delete(&id)).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("{} {} deleted", <R::Entity as Entity>::LABEL, deleted),
        "timestamp": Utc::now(),
    })))
}

/// Registers list/create at `path` and get/patch/delete at `path/{id}`.
///
/// Call after any fixed sub-routes so they win over `{id}`.
pub fn crud_routes<R: Resource>(cfg: &mut web::ServiceConfig, path: &str) {
    cfg.route(path, web::get().to(list::<R>))
        .route(&format!("{}/", path), web::get().to(list::<R>))
        .route(path, web::post().to(create::<R>))
        .route(&format!("{}/", path), web::post().to(create::<R>))
        .route(&format!("{}/{{id}}", path), web::get().to(get::<R>))
        .route(&format!("{}/{{id}}", path), web::patch().to(update::<R>))
        .route(&format!("{}/{{id}}", path), web::delete().to(delete::<R>));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_limit_uses_the_configured_default() {
        let pagination = ListQuery::default().into_pagination(25);
        assert_eq!(pagination.limit, 25);
        assert_eq!(pagination.skip, 0);
        assert_eq!(pagination.sort_order, 1);

        let pagination = ListQuery {
            skip: Some(40),
            limit: Some(10),
            sort_by: Some("name".to_string()),
            sort_order: Some(-1),
        }
        .into_pagination(25);
        assert_eq!(pagination, Pagination {
            skip: 40,
            limit: 10,
            sort_by: Some("name".to_string()),
            sort_order: -1,
        });
    }
}
