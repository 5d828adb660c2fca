use actix_web::web;

use super::handlers;

/// Register the stub endpoint's routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/predict").route(web::post().to(handlers::predict)))
        .service(web::resource("/health").route(web::get().to(handlers::health)));
}
