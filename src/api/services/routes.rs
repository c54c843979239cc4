//! API 路由配置
//!
//! 各资源的路由定义在各自模块中，这里只负责挂到 `/api` 下。

use actix_web::web;

use super::analytics::analytics_routes;
use super::health::health_routes;
use super::icons::icons_routes;
use super::links::links_routes;
use super::objects::{images_routes, object_serving_routes, object_upload_routes};
use super::redirect::redirect_routes;
use super::subsites::subsites_routes;
use super::themes::themes_routes;

/// `/api` 下的全部 JSON 接口
pub fn api_routes() -> actix_web::Scope {
    web::scope("/api")
        .service(themes_routes())
        .service(subsites_routes())
        .service(links_routes())
        .service(analytics_routes())
        .service(icons_routes())
        .service(object_upload_routes())
        .service(images_routes())
}

/// 注册全部路由：`/health`、`/api`、`/go`、`/objects`
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health_routes())
        .service(api_routes())
        .service(redirect_routes())
        .service(object_serving_routes());
}
