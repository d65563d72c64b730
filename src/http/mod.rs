//! REST layer over the query services.
//!
//! [`EldenDataHttpServer`] owns the bind address and the shared [`AppContext`]; [`configure`]
//! registers every route so tests can mount the same application with `actix_web::test`.

pub mod armor_routes;
pub mod boss_routes;
pub mod class_routes;
pub mod error;
pub mod resource;
pub mod system_routes;
pub mod weapon_routes;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer as ActixHttpServer};
use log::info;

use crate::config::AppConfig;
use crate::context::AppContext;
use crate::error::{EldenDataError, EldenDataResult};
use resource::{crud_routes, Incantations, Sorceries};

/// Registers the root endpoints and every entity route under the configured prefix.
pub fn configure(cfg: &mut web::ServiceConfig, api_prefix: &str) {
    cfg.app_data(error::json_config())
        .app_data(error::query_config())
        .app_data(error::path_config())
        .route("/", web::get().to(system_routes::index))
        .route("/health", web::get().to(system_routes::health))
        .service(
            web::scope(api_prefix)
                .route("/health", web::get().to(system_routes::api_health))
                .configure(weapon_routes::configure)
                .configure(armor_routes::configure)
                .configure(boss_routes::configure)
                .configure(class_routes::configure)
                .configure(|cfg| {
                    crud_routes::<Sorceries>(cfg, "/sorceries");
                    crud_routes::<Incantations>(cfg, "/incantations");
                }),
        );
}

fn cors(config: &AppConfig) -> Cors {
    let cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600);
    if config.allows_any_origin() {
        cors.allow_any_origin()
    } else {
        config
            .cors_origins
            .iter()
            .fold(cors, |cors, origin| cors.allowed_origin(origin))
    }
}

/// HTTP server for the query layer.
pub struct EldenDataHttpServer {
    context: AppContext,
    bind_address: String,
}

impl EldenDataHttpServer {
    pub fn new(context: AppContext) -> Self {
        let bind_address = context.config().bind_address();
        Self {
            context,
            bind_address,
        }
    }

    pub fn bind_address(&self) -> &str {
        &self.bind_address
    }

    /// Serves until the process is interrupted.
    pub async fn run(&self) -> EldenDataResult<()> {
        info!("HTTP server running on {}", self.bind_address);
        let data = web::Data::new(self.context.clone());
        let config = self.context.config().clone();

        let server = ActixHttpServer::new(move || {
            let prefix = config.api_prefix.clone();
            App::new()
                .wrap(middleware::Logger::default())
                .wrap(cors(&config))
                .app_data(data.clone())
                .configure(|cfg| configure(cfg, &prefix))
        })
        .bind(&self.bind_address)
        .map_err(|e| EldenDataError::configuration_error(format!("Failed to bind HTTP server: {}", e)))?
        .run();

        server
            .await
            .map_err(|e| EldenDataError::configuration_error(format!("HTTP server error: {}", e)))?;
        Ok(())
    }
}
