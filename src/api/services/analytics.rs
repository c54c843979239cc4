//! 统计接口 `/api/analytics`

use std::sync::Arc;

use actix_web::{HttpResponse, web};
use tracing::trace;

use crate::services::{AnalyticsService, TrackEventRequest};

use super::helpers::{api_result, created_result};
use super::types::LimitQuery;

pub async fn track_event(
    body: web::Json<TrackEventRequest>,
    service: web::Data<Arc<AnalyticsService>>,
) -> HttpResponse {
    created_result(service.track(body.into_inner()).await)
}

pub async fn get_summary(service: web::Data<Arc<AnalyticsService>>) -> HttpResponse {
    trace!("API: analytics summary");
    api_result(service.summary().await)
}

pub async fn get_top_subsites(
    query: web::Query<LimitQuery>,
    service: web::Data<Arc<AnalyticsService>>,
) -> HttpResponse {
    api_result(service.top_subsites(query.limit).await)
}

pub async fn get_top_links(
    query: web::Query<LimitQuery>,
    service: web::Data<Arc<AnalyticsService>>,
) -> HttpResponse {
    api_result(service.top_links(query.limit).await)
}

pub async fn get_recent(
    query: web::Query<LimitQuery>,
    service: web::Data<Arc<AnalyticsService>>,
) -> HttpResponse {
    api_result(service.recent_activity(query.limit).await)
}

pub fn analytics_routes() -> actix_web::Scope {
    web::scope("/analytics")
        .route("/track", web::post().to(track_event))
        .route("/summary", web::get().to(get_summary))
        .route("/top-subsites", web::get().to(get_top_subsites))
        .route("/top-links", web::get().to(get_top_links))
        .route("/recent", web::get().to(get_recent))
}
