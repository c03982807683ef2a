/// HTTP handlers for story endpoints
///
/// - Stories: create, list, show, edit, update, delete, per-user listing, search
/// - Dashboard: the caller's own stories
/// - Health: liveness/readiness probes
pub mod health;
pub mod stories;
pub mod views;

pub use stories::{
    add_story_form, create_story, dashboard, delete_story, edit_story_form, get_story,
    get_user_stories, list_public_stories, search_stories, update_story, ListingErrorPolicy,
};

use crate::error::AppError;
use crate::metrics;
use crate::middleware::{JwtAuthMiddleware, JwtValidator};
use actix_web::web;
use std::sync::Arc;

/// Register every route. Shared by the binary and the integration tests.
///
/// Expects `web::Data<StoryAccessController>` and `web::Data<ListingErrorPolicy>`
/// to be registered on the app.
pub fn configure(validator: Arc<JwtValidator>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(
            web::PathConfig::default()
                .error_handler(|err, _| AppError::NotFound(err.to_string()).into()),
        )
        .app_data(
            web::JsonConfig::default()
                .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
        )
        .app_data(
            web::FormConfig::default()
                .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
        )
        .route("/metrics", web::get().to(metrics::serve_metrics))
        .route("/api/v1/health", web::get().to(health::health_summary))
        .route("/api/v1/health/ready", web::get().to(health::readiness))
        .route("/api/v1/health/live", web::get().to(health::liveness))
        .service(
            web::scope("/dashboard")
                .wrap(JwtAuthMiddleware::new(validator.clone()))
                .route("", web::get().to(dashboard)),
        )
        .service(
            web::scope("/stories")
                .wrap(JwtAuthMiddleware::new(validator))
                .service(
                    web::resource("")
                        .route(web::get().to(list_public_stories))
                        .route(web::post().to(create_story)),
                )
                .route("/add", web::get().to(add_story_form))
                .route("/edit/{story_id}", web::get().to(edit_story_form))
                .route("/user/{user_id}", web::get().to(get_user_stories))
                .route("/search", web::get().to(search_stories))
                .route("/search/{query}", web::get().to(search_stories))
                .service(
                    web::resource("/{story_id}")
                        .route(web::get().to(get_story))
                        .route(web::put().to(update_story))
                        .route(web::delete().to(delete_story)),
                ),
        );
    }
}
