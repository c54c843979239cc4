use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use std::sync::Arc;
use tracing::{info, trace, warn};

use crate::services::{AppStartTime, ContentService, check_health};

use super::helpers::json_response;

/// Health Service
///
/// 直接探测存储，不走业务校验（探针要求快速响应）
pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        service: web::Data<Arc<ContentService>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        trace!("Received health check request");

        let report = check_health(service.store(), &app_start_time).await;
        let status = if report.is_healthy() {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };

        info!(
            "Health check completed in {}ms, status: {}, uptime: {}s",
            report.response_time_ms, report.status, report.uptime
        );
        json_response(status, &report)
    }

    // 就绪检查：存储可用时 200
    pub async fn readiness_check(service: web::Data<Arc<ContentService>>) -> impl Responder {
        trace!("Received readiness check request");

        match service.store().ping().await {
            Ok(()) => HttpResponse::Ok()
                .append_header(("Content-Type", "text/plain"))
                .body("OK"),
            Err(e) => {
                warn!("Readiness check failed: {}", e);
                HttpResponse::ServiceUnavailable()
                    .append_header(("Content-Type", "text/plain"))
                    .body("NOT READY")
            }
        }
    }

    // 活跃性检查
    pub async fn liveness_check() -> impl Responder {
        trace!("Received liveness check request");

        HttpResponse::NoContent().finish()
    }
}

/// Health 路由配置
pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("", web::get().to(HealthService::health_check))
        .route("", web::head().to(HealthService::health_check))
        .route("/ready", web::get().to(HealthService::readiness_check))
        .route("/ready", web::head().to(HealthService::readiness_check))
        .route("/live", web::get().to(HealthService::liveness_check))
        .route("/live", web::head().to(HealthService::liveness_check))
}
