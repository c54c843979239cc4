//! 主题接口 `/api/themes`

use std::sync::Arc;

use actix_web::{HttpResponse, web};
use tracing::trace;

use crate::services::ContentService;
use crate::storage::{NewTheme, ThemePatch};

use super::helpers::{api_result, created_result, deleted_result, success_response};

pub async fn list_themes(service: web::Data<Arc<ContentService>>) -> HttpResponse {
    trace!("API: list themes");
    api_result(service.list_themes().await)
}

pub async fn list_theme_templates(service: web::Data<Arc<ContentService>>) -> HttpResponse {
    success_response(service.templates())
}

pub async fn get_theme(
    path: web::Path<String>,
    service: web::Data<Arc<ContentService>>,
) -> HttpResponse {
    api_result(service.get_theme(&path).await)
}

pub async fn create_theme(
    body: web::Json<NewTheme>,
    service: web::Data<Arc<ContentService>>,
) -> HttpResponse {
    created_result(service.create_theme(body.into_inner()).await)
}

pub async fn update_theme(
    path: web::Path<String>,
    body: web::Json<ThemePatch>,
    service: web::Data<Arc<ContentService>>,
) -> HttpResponse {
    api_result(service.update_theme(&path, body.into_inner()).await)
}

pub async fn delete_theme(
    path: web::Path<String>,
    service: web::Data<Arc<ContentService>>,
) -> HttpResponse {
    let id = path.into_inner();
    deleted_result(service.delete_theme(&id).await, "Theme", &id)
}

/// 主题路由 `/themes`
///
/// `/templates` 必须在 `/{id}` 之前注册
pub fn themes_routes() -> actix_web::Scope {
    web::scope("/themes")
        .route("", web::get().to(list_themes))
        .route("", web::post().to(create_theme))
        .route("/templates", web::get().to(list_theme_templates))
        .route("/{id}", web::get().to(get_theme))
        .route("/{id}", web::patch().to(update_theme))
        .route("/{id}", web::delete().to(delete_theme))
}
