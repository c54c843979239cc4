//! 链接接口 `/api/links`

use std::sync::Arc;

use actix_web::{HttpResponse, web};
use tracing::trace;

use crate::services::ContentService;
use crate::storage::{LinkPatch, NewLink};

use super::helpers::{api_result, created_result, deleted_result};

pub async fn list_links(service: web::Data<Arc<ContentService>>) -> HttpResponse {
    trace!("API: list links");
    api_result(service.list_links().await)
}

pub async fn get_link(
    path: web::Path<String>,
    service: web::Data<Arc<ContentService>>,
) -> HttpResponse {
    api_result(service.get_link(&path).await)
}

pub async fn create_link(
    body: web::Json<NewLink>,
    service: web::Data<Arc<ContentService>>,
) -> HttpResponse {
    created_result(service.create_link(body.into_inner()).await)
}

pub async fn update_link(
    path: web::Path<String>,
    body: web::Json<LinkPatch>,
    service: web::Data<Arc<ContentService>>,
) -> HttpResponse {
    api_result(service.update_link(&path, body.into_inner()).await)
}

pub async fn delete_link(
    path: web::Path<String>,
    service: web::Data<Arc<ContentService>>,
) -> HttpResponse {
    let id = path.into_inner();
    deleted_result(service.delete_link(&id).await, "Link", &id)
}

pub fn links_routes() -> actix_web::Scope {
    web::scope("/links")
        .route("", web::get().to(list_links))
        .route("", web::post().to(create_link))
        .route("/{id}", web::get().to(get_link))
        .route("/{id}", web::patch().to(update_link))
        .route("/{id}", web::delete().to(delete_link))
}
