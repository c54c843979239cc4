//! 链接跳转 `/go/{link_id}`
//!
//! 记录一次点击（后台写入）后 307 到链接地址。

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use tracing::{debug, error, trace};

use crate::services::{AnalyticsService, ContentService};
use crate::storage::{EventType, Link, ResourceType};

pub struct RedirectService;

impl RedirectService {
    pub async fn handle_redirect(
        path: web::Path<String>,
        content: web::Data<Arc<ContentService>>,
        analytics: web::Data<Arc<AnalyticsService>>,
    ) -> HttpResponse {
        let link_id = path.into_inner();
        trace!("Redirect requested for link {}", link_id);

        match content.store().get_link(&link_id).await {
            Ok(Some(link)) => {
                analytics.record(EventType::Click, ResourceType::Link, &link.id);
                Self::finish_redirect(&link)
            }
            Ok(None) => {
                debug!("Redirect link not found: {}", link_id);
                Self::not_found_response()
            }
            Err(e) => {
                error!("Failed to load link {} for redirect: {}", link_id, e);
                Self::error_response()
            }
        }
    }

    #[inline]
    fn finish_redirect(link: &Link) -> HttpResponse {
        HttpResponse::build(StatusCode::TEMPORARY_REDIRECT)
            .insert_header(("Location", link.url.as_str()))
            .insert_header(("Cache-Control", "no-store"))
            .finish()
    }

    #[inline]
    fn not_found_response() -> HttpResponse {
        HttpResponse::build(StatusCode::NOT_FOUND)
            .insert_header(("Content-Type", "text/html; charset=utf-8"))
            .body("Not Found")
    }

    #[inline]
    fn error_response() -> HttpResponse {
        HttpResponse::build(StatusCode::INTERNAL_SERVER_ERROR)
            .insert_header(("Content-Type", "text/html; charset=utf-8"))
            .body("Internal Server Error")
    }
}

pub fn redirect_routes() -> actix_web::Scope {
    web::scope("/go").route("/{link_id}", web::get().to(RedirectService::handle_redirect))
}
