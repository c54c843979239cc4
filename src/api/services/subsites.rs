//! 子站点接口 `/api/subsites`

use std::sync::Arc;

use actix_web::{HttpResponse, web};
use tracing::trace;

use crate::services::ContentService;
use crate::storage::{NewSubsite, SubsitePatch};

use super::helpers::{api_result, created_result, deleted_result};
use super::types::ReorderRequest;

pub async fn list_subsites(service: web::Data<Arc<ContentService>>) -> HttpResponse {
    trace!("API: list subsites");
    api_result(service.list_subsites().await)
}

pub async fn get_subsite(
    path: web::Path<String>,
    service: web::Data<Arc<ContentService>>,
) -> HttpResponse {
    api_result(service.get_subsite(&path).await)
}

pub async fn create_subsite(
    body: web::Json<NewSubsite>,
    service: web::Data<Arc<ContentService>>,
) -> HttpResponse {
    created_result(service.create_subsite(body.into_inner()).await)
}

pub async fn update_subsite(
    path: web::Path<String>,
    body: web::Json<SubsitePatch>,
    service: web::Data<Arc<ContentService>>,
) -> HttpResponse {
    api_result(service.update_subsite(&path, body.into_inner()).await)
}

pub async fn delete_subsite(
    path: web::Path<String>,
    service: web::Data<Arc<ContentService>>,
) -> HttpResponse {
    let id = path.into_inner();
    deleted_result(service.delete_subsite(&id).await, "Subsite", &id)
}

pub async fn list_children(
    path: web::Path<String>,
    service: web::Data<Arc<ContentService>>,
) -> HttpResponse {
    api_result(service.child_subsites(&path).await)
}

pub async fn get_breadcrumb(
    path: web::Path<String>,
    service: web::Data<Arc<ContentService>>,
) -> HttpResponse {
    api_result(service.breadcrumb(&path).await)
}

pub async fn list_subsite_links(
    path: web::Path<String>,
    service: web::Data<Arc<ContentService>>,
) -> HttpResponse {
    api_result(service.links_by_subsite(&path).await)
}

pub async fn reorder_subsites(
    body: web::Json<ReorderRequest>,
    service: web::Data<Arc<ContentService>>,
) -> HttpResponse {
    let ids = body.into_inner().ids;
    match service.reorder_subsites(&ids).await {
        Ok(()) => api_result(service.list_subsites().await),
        Err(e) => api_result::<()>(Err(e)),
    }
}

pub async fn reorder_subsite_links(
    path: web::Path<String>,
    body: web::Json<ReorderRequest>,
    service: web::Data<Arc<ContentService>>,
) -> HttpResponse {
    let subsite_id = path.into_inner();
    let ids = body.into_inner().ids;
    match service.reorder_links(&subsite_id, &ids).await {
        Ok(()) => api_result(service.links_by_subsite(&subsite_id).await),
        Err(e) => api_result::<()>(Err(e)),
    }
}

/// 子站点路由 `/subsites`
///
/// `/reorder` 必须在 `/{id}` 之前注册
pub fn subsites_routes() -> actix_web::Scope {
    web::scope("/subsites")
        .route("", web::get().to(list_subsites))
        .route("", web::post().to(create_subsite))
        .route("/reorder", web::put().to(reorder_subsites))
        .route("/{id}/children", web::get().to(list_children))
        .route("/{id}/breadcrumb", web::get().to(get_breadcrumb))
        .route("/{id}/links/reorder", web::put().to(reorder_subsite_links))
        .route("/{id}/links", web::get().to(list_subsite_links))
        .route("/{id}", web::get().to(get_subsite))
        .route("/{id}", web::patch().to(update_subsite))
        .route("/{id}", web::delete().to(delete_subsite))
}
