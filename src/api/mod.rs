//! Stub prediction endpoint.
//!
//! Speaks the same wire contract as the external predictor so the workflow
//! can be exercised locally. It performs no inference: each model's verdict
//! comes from a configured probability.

use std::net::SocketAddr;

use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use tracing::info;
use tracing_actix_web::TracingLogger;

use crate::config::StubConfig;

pub mod handlers;
pub mod routes;

pub use handlers::StubModels;
pub use routes::configure;

/// Bind the stub endpoint; the returned server still has to be awaited or spawned.
pub fn bind(config: &StubConfig) -> std::io::Result<(Server, Vec<SocketAddr>)> {
    let models = web::Data::new(StubModels::from(config));

    let server = HttpServer::new(move || {
        App::new()
            .app_data(models.clone())
            .wrap(TracingLogger::default())
            .configure(configure)
    })
    .workers(1)
    .bind((config.host.as_str(), config.port))?;

    let addrs = server.addrs();
    info!(?addrs, "stub prediction endpoint listening");
    Ok((server.run(), addrs))
}
