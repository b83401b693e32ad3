use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;
use std::time::Duration;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod model;
mod models;
mod notify;
mod policy;
mod routes;
mod utils;

use config::Config;
use db::init_db;

use crate::api::attendance::{self, SweepOutcome};
use crate::docs::ApiDoc;
use crate::utils::settings_cache;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "HRPulse"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url).await;

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    let pool_for_warmup = pool.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = settings_cache::warmup(&pool_for_warmup).await {
            eprintln!("Failed to warm up settings cache: {:?}", e);
        }
    });

    // Background auto-clock-out ticker. The manual endpoint can still be hit
    // at any time; overlapping runs are harmless.
    if config.sweep_interval_secs > 0 {
        let pool_for_sweep = pool.clone();
        let interval_secs = config.sweep_interval_secs;
        actix_web::rt::spawn(async move {
            let mut ticker = actix_web::rt::time::interval(Duration::from_secs(interval_secs));
            loop {
                ticker.tick().await;
                match attendance::run_sweep(&pool_for_sweep).await {
                    Ok(SweepOutcome::Processed { updated, pending }) if pending > 0 => {
                        info!(updated, pending, "Auto clock-out sweep completed");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(error = %e, "Auto clock-out sweep failed");
                    }
                }
            }
        });
    }

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(config.clone()))
            .service(index)
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await
}
