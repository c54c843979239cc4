//! 对象上传与读取
//!
//! 流程：`POST /api/objects/upload` 取得上传地址 → `PUT` 原始内容 →
//! `PUT /api/images` 校验并公开 → `GET /objects/uploads/<id>` 读取。

use std::sync::Arc;

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use bytes::Bytes;

use crate::services::LocalObjectStore;

use super::helpers::{api_result, error_from_portal};
use super::types::{FinalizeImageRequest, ObjectPathResponse, UploadUrlResponse};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

pub async fn request_upload_url(store: web::Data<Arc<LocalObjectStore>>) -> HttpResponse {
    api_result(
        store
            .create_upload_target()
            .await
            .map(|target| UploadUrlResponse {
                upload_url: target.upload_url,
            }),
    )
}

pub async fn upload_object(
    req: HttpRequest,
    path: web::Path<String>,
    body: Bytes,
    store: web::Data<Arc<LocalObjectStore>>,
) -> HttpResponse {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim())
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_CONTENT_TYPE);

    api_result(store.put(&path, content_type, &body).await)
}

pub async fn finalize_image(
    body: web::Json<FinalizeImageRequest>,
    store: web::Data<Arc<LocalObjectStore>>,
) -> HttpResponse {
    api_result(
        store
            .finalize_image(&body.image_url)
            .await
            .map(|object_path| ObjectPathResponse { object_path }),
    )
}

pub async fn serve_object(
    path: web::Path<String>,
    store: web::Data<Arc<LocalObjectStore>>,
) -> HttpResponse {
    match store.get(&path).await {
        Ok(object) => HttpResponse::Ok()
            .insert_header((header::CONTENT_TYPE, object.metadata.content_type))
            .insert_header((header::CACHE_CONTROL, "public, max-age=3600"))
            .body(object.bytes),
        Err(e) => error_from_portal(&e),
    }
}

/// 上传路由 `/api/objects`
pub fn object_upload_routes() -> actix_web::Scope {
    web::scope("/objects")
        .route("/upload", web::post().to(request_upload_url))
        .route("/upload/{id}", web::put().to(upload_object))
}

/// 图片确认路由 `/api/images`
pub fn images_routes() -> actix_web::Scope {
    web::scope("/images").route("", web::put().to(finalize_image))
}

/// 公开对象读取 `/objects/{path}`
pub fn object_serving_routes() -> actix_web::Scope {
    web::scope("/objects").route("/{path:.*}", web::get().to(serve_object))
}
