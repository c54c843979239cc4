//! Server mode
//!
//! This module contains the HTTP server startup logic.
//! It configures and starts the HTTP server with all necessary routes.

use actix_cors::Cors;
use actix_web::{
    App, HttpServer,
    http::{Method, header},
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::middleware::{REQUEST_ID_HEADER, RequestIdMiddleware};
use crate::api::services::{configure_routes, json_config, path_config, query_config};
use crate::config::ApiConfig;
use crate::runtime::lifetime;
use crate::services::AppStartTime;

/// 工作线程上限
const MAX_WORKERS: usize = 32;

/// Build CORS middleware from configuration
///
/// 未配置来源时允许任意来源（门户客户端通常与 API 分开部署）
fn build_cors_middleware(api: &ApiConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::HEAD,
        ])
        .allowed_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allowed_header(REQUEST_ID_HEADER)
        .expose_headers([REQUEST_ID_HEADER])
        .max_age(3600);

    if api.cors_allowed_origins.is_empty() || api.cors_allowed_origins.iter().any(|o| o == "*") {
        cors = cors.allow_any_origin();
    } else {
        for origin in &api.cors_allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let app_start_time = AppStartTime::now();

    let startup = lifetime::startup::prepare_server_startup()
        .await
        .inspect_err(|e| tracing::error!("Server startup failed: {:#}", e))?;

    let config = crate::config::get_config();
    let api_config = config.api.clone();
    let max_upload_bytes = config.objects.max_upload_bytes;

    if api_config.cors_allowed_origins.is_empty() {
        warn!("cors_allowed_origins is empty; accepting cross-origin requests from any origin");
    }

    let cpu_count = config.server.cpu_count.clamp(1, MAX_WORKERS);
    info!("Using {} worker threads", cpu_count);

    let content_service = startup.content_service.clone();
    let analytics_service = startup.analytics_service.clone();
    let object_store = startup.object_store.clone();

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(build_cors_middleware(&api_config))
            .wrap(Compress::default())
            .wrap(DefaultHeaders::new().add(("Cache-Control", "no-cache")))
            .app_data(json_config(api_config.max_json_payload_bytes))
            .app_data(query_config())
            .app_data(path_config())
            .app_data(web::PayloadConfig::new(max_upload_bytes))
            .app_data(web::Data::new(content_service.clone()))
            .app_data(web::Data::new(analytics_service.clone()))
            .app_data(web::Data::new(object_store.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .configure(configure_routes)
    })
    .workers(cpu_count)
    .keep_alive(std::time::Duration::from_secs(30))
    .shutdown_timeout(config.server.shutdown_timeout)
    .disable_signals();

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    let server = server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run();
    warn!("Starting server at http://{}", bind_address);

    let handle = server.handle();
    tokio::select! {
        res = server => {
            res.context("HTTP server terminated with an error")?;
        }
        _ = lifetime::shutdown::listen_for_shutdown(handle, config.server.shutdown_timeout) => {
            warn!("Graceful shutdown complete");
        }
    }

    Ok(())
}
