//! HTTP 接口集成测试
//!
//! 使用内存存储和临时对象目录装配完整路由。

use std::sync::{Arc, Once};
use std::time::Duration;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use serde_json::{Value, json};
use tempfile::TempDir;

use portalkit::api::services::{configure_routes, json_config, path_config, query_config};
use portalkit::config::init_config;
use portalkit::runtime::lifetime::startup::StartupContext;
use portalkit::services::{AppStartTime, LocalObjectStore};
use portalkit::storage::Storage;

static INIT: Once = Once::new();

fn init_test_config() {
    INIT.call_once(|| {
        init_config();
    });
}

fn test_context(objects_dir: &TempDir) -> StartupContext {
    init_test_config();
    let object_store = LocalObjectStore::new(objects_dir.path(), 1024, 4096);
    StartupContext::from_storage(Storage::in_memory(), object_store)
}

macro_rules! init_app {
    ($ctx:expr) => {
        test::init_service(
            App::new()
                .app_data(json_config(64 * 1024))
                .app_data(query_config())
                .app_data(path_config())
                .app_data(web::Data::new($ctx.content_service.clone()))
                .app_data(web::Data::new($ctx.analytics_service.clone()))
                .app_data(web::Data::new($ctx.object_store.clone()))
                .app_data(web::Data::new(AppStartTime::now()))
                .configure(configure_routes),
        )
        .await
    };
}

macro_rules! post_json {
    ($app:expr, $uri:expr, $body:expr) => {{
        let req = test::TestRequest::post()
            .uri($uri)
            .set_json($body)
            .to_request();
        test::call_service(&$app, req).await
    }};
}

macro_rules! get {
    ($app:expr, $uri:expr) => {{
        let req = test::TestRequest::get().uri($uri).to_request();
        test::call_service(&$app, req).await
    }};
}

// ============ Subsites & links ============

#[actix_rt::test]
async fn test_subsite_lifecycle() {
    let dir = TempDir::new().unwrap();
    let ctx = test_context(&dir);
    let app = init_app!(ctx);

    let resp = post_json!(app, "/api/subsites", json!({"name": "Engineering", "order": "2"}));
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["name"], "Engineering");
    assert_eq!(created["order"], 2);
    assert_eq!(created["parentId"], Value::Null);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/subsites/{}", id))
        .set_json(json!({"description": "Builds things"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = test::read_body_json(resp).await;
    assert_eq!(updated["description"], "Builds things");
    assert_eq!(updated["name"], "Engineering");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/subsites/{}", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/subsites/{}", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 1004);
}

#[actix_rt::test]
async fn test_validation_error_body() {
    let dir = TempDir::new().unwrap();
    let ctx = test_context(&dir);
    let app = init_app!(ctx);

    let resp = post_json!(app, "/api/subsites", json!({"name": "  "}));
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 1001);
    assert!(body["message"].as_str().unwrap().contains("name"));

    let resp = get!(app, "/api/subsites/unknown");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/links")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 1000);
}

#[actix_rt::test]
async fn test_hierarchy_endpoints() {
    let dir = TempDir::new().unwrap();
    let ctx = test_context(&dir);
    let app = init_app!(ctx);

    let resp = post_json!(app, "/api/subsites", json!({"name": "Root"}));
    let root: Value = test::read_body_json(resp).await;
    let root_id = root["id"].as_str().unwrap().to_string();

    let resp = post_json!(
        app,
        "/api/subsites",
        json!({"name": "Child", "parentId": root_id, "icon": "Home"})
    );
    assert_eq!(resp.status(), StatusCode::CREATED);
    let child: Value = test::read_body_json(resp).await;
    let child_id = child["id"].as_str().unwrap().to_string();
    assert_eq!(child["icon"], json!({"kind": "symbol", "name": "Home"}));

    let resp = get!(app, &format!("/api/subsites/{}/children", root_id));
    let children: Vec<Value> = test::read_body_json(resp).await;
    assert_eq!(children.len(), 1);
    assert_eq!(children[0]["id"], child_id.as_str());

    let resp = get!(app, &format!("/api/subsites/{}/breadcrumb", child_id));
    let trail: Vec<Value> = test::read_body_json(resp).await;
    let names: Vec<&str> = trail.iter().map(|s| s["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Root", "Child"]);

    // 把根挂到自己的子节点下
    let req = test::TestRequest::patch()
        .uri(&format!("/api/subsites/{}", root_id))
        .set_json(json!({"parentId": child_id}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_hierarchy_depth_limit() {
    let dir = TempDir::new().unwrap();
    let ctx = test_context(&dir);
    let app = init_app!(ctx);

    let mut parent: Option<String> = None;
    for level in 0..64 {
        let resp = post_json!(
            app,
            "/api/subsites",
            json!({"name": format!("Level {}", level), "parentId": parent})
        );
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        parent = created["id"].as_str().map(str::to_string);
    }
    let deepest = parent.unwrap();

    let resp = get!(app, &format!("/api/subsites/{}/breadcrumb", deepest));
    assert_eq!(resp.status(), StatusCode::OK);
    let trail: Vec<Value> = test::read_body_json(resp).await;
    assert_eq!(trail.len(), 64);

    let resp = post_json!(
        app,
        "/api/subsites",
        json!({"name": "Too deep", "parentId": deepest})
    );
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 1001);

    // 移动到最深处同样受限
    let resp = post_json!(app, "/api/subsites", json!({"name": "Loose"}));
    let loose: Value = test::read_body_json(resp).await;
    let req = test::TestRequest::patch()
        .uri(&format!("/api/subsites/{}", loose["id"].as_str().unwrap()))
        .set_json(json!({"parentId": deepest}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_icon_url_field_accepted() {
    let dir = TempDir::new().unwrap();
    let ctx = test_context(&dir);
    let app = init_app!(ctx);

    let resp = post_json!(app, "/api/subsites", json!({"name": "Docs", "iconUrl": "Home"}));
    assert_eq!(resp.status(), StatusCode::CREATED);
    let site: Value = test::read_body_json(resp).await;
    assert_eq!(site["icon"], json!({"kind": "symbol", "name": "Home"}));

    let req = test::TestRequest::patch()
        .uri(&format!("/api/subsites/{}", site["id"].as_str().unwrap()))
        .set_json(json!({"iconUrl": null}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let site: Value = test::read_body_json(resp).await;
    assert_eq!(site["icon"], Value::Null);
}

#[actix_rt::test]
async fn test_links_and_reorder() {
    let dir = TempDir::new().unwrap();
    let ctx = test_context(&dir);
    let app = init_app!(ctx);

    let resp = post_json!(app, "/api/subsites", json!({"name": "Docs"}));
    let site: Value = test::read_body_json(resp).await;
    let site_id = site["id"].as_str().unwrap().to_string();

    let mut link_ids = Vec::new();
    for name in ["Guide", "Reference", "FAQ"] {
        let resp = post_json!(
            app,
            "/api/links",
            json!({
                "subsiteId": site_id,
                "name": name,
                "url": format!("https://docs.example.com/{}", name.to_lowercase()),
            })
        );
        assert_eq!(resp.status(), StatusCode::CREATED);
        let link: Value = test::read_body_json(resp).await;
        link_ids.push(link["id"].as_str().unwrap().to_string());
    }

    let reversed: Vec<String> = link_ids.iter().rev().cloned().collect();
    let req = test::TestRequest::put()
        .uri(&format!("/api/subsites/{}/links/reorder", site_id))
        .set_json(json!({"ids": reversed}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let links: Vec<Value> = test::read_body_json(resp).await;
    let names: Vec<&str> = links.iter().map(|l| l["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["FAQ", "Reference", "Guide"]);
    assert_eq!(links[0]["order"], 0);

    let req = test::TestRequest::put()
        .uri("/api/subsites/reorder")
        .set_json(json!({"ids": [site_id, "ghost"]}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = post_json!(
        app,
        "/api/links",
        json!({"subsiteId": site_id, "name": "Bad", "url": "javascript:alert(1)"})
    );
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = post_json!(
        app,
        "/api/links",
        json!({"subsiteId": site_id, "name": "Split", "url": "https://docs.example.com/a\nb"})
    );
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // 删除子站点后其链接一并消失
    let req = test::TestRequest::delete()
        .uri(&format!("/api/subsites/{}", site_id))
        .to_request();
    test::call_service(&app, req).await;
    let resp = get!(app, "/api/links");
    let remaining: Vec<Value> = test::read_body_json(resp).await;
    assert!(remaining.is_empty());
}

// ============ Redirect & analytics ============

#[actix_rt::test]
async fn test_go_redirect_records_click() {
    let dir = TempDir::new().unwrap();
    let ctx = test_context(&dir);
    let app = init_app!(ctx);

    let resp = post_json!(app, "/api/subsites", json!({"name": "Tools"}));
    let site: Value = test::read_body_json(resp).await;
    let resp = post_json!(
        app,
        "/api/links",
        json!({"subsiteId": site["id"], "name": "Status", "url": "https://status.example.com"})
    );
    let link: Value = test::read_body_json(resp).await;
    let link_id = link["id"].as_str().unwrap().to_string();

    let resp = get!(app, &format!("/go/{}", link_id));
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "https://status.example.com"
    );

    let resp = get!(app, "/go/unknown");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let mut clicks = Value::Null;
    for _ in 0..50 {
        let resp = get!(app, "/api/analytics/top-links");
        let top: Vec<Value> = test::read_body_json(resp).await;
        if let Some(first) = top.first() {
            clicks = first["clicks"].clone();
            assert_eq!(first["name"], "Status");
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(clicks, 1);
}

#[actix_rt::test]
async fn test_analytics_endpoints() {
    let dir = TempDir::new().unwrap();
    let ctx = test_context(&dir);
    let app = init_app!(ctx);

    for id in ["a", "a", "b"] {
        let resp = post_json!(
            app,
            "/api/analytics/track",
            json!({"eventType": "view", "resourceType": "subsite", "resourceId": id})
        );
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = post_json!(
        app,
        "/api/analytics/track",
        json!({"eventType": "hover", "resourceType": "subsite", "resourceId": "a"})
    );
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = get!(app, "/api/analytics/summary");
    let summary: Value = test::read_body_json(resp).await;
    assert_eq!(
        summary,
        json!({"subsiteViews": 3, "linkClicks": 0, "totalEvents": 3})
    );

    let resp = get!(app, "/api/analytics/top-subsites?limit=1");
    let top: Vec<Value> = test::read_body_json(resp).await;
    assert_eq!(top.len(), 1);
    assert_eq!(top[0]["id"], "a");
    assert_eq!(top[0]["views"], 2);

    let resp = get!(app, "/api/analytics/recent?limit=2");
    let recent: Vec<Value> = test::read_body_json(resp).await;
    assert_eq!(recent.len(), 2);
    assert!(recent[0]["timestamp"].is_string());

    let resp = get!(app, "/api/analytics/recent?limit=abc");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ============ Themes & icons ============

#[actix_rt::test]
async fn test_themes_and_templates() {
    let dir = TempDir::new().unwrap();
    let ctx = test_context(&dir);
    let app = init_app!(ctx);

    let resp = get!(app, "/api/themes/templates");
    assert_eq!(resp.status(), StatusCode::OK);
    let templates: Vec<Value> = test::read_body_json(resp).await;
    assert_eq!(templates.len(), 6);
    let colors = templates[0]["colors"].clone();
    assert!(colors["textSecondary"].is_string());

    let resp = post_json!(app, "/api/themes", json!({"name": "Custom", "colors": colors}));
    assert_eq!(resp.status(), StatusCode::CREATED);
    let theme: Value = test::read_body_json(resp).await;
    let theme_id = theme["id"].as_str().unwrap().to_string();

    let resp = get!(app, "/api/themes");
    let themes: Vec<Value> = test::read_body_json(resp).await;
    assert_eq!(themes.len(), 1);

    let req = test::TestRequest::patch()
        .uri("/api/themes/ghost")
        .set_json(json!({"name": "Nope"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/themes/{}", theme_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[actix_rt::test]
async fn test_icons_listing_and_search() {
    let dir = TempDir::new().unwrap();
    let ctx = test_context(&dir);
    let app = init_app!(ctx);

    let resp = get!(app, "/api/icons");
    let categories: Vec<Value> = test::read_body_json(resp).await;
    assert!(!categories.is_empty());
    assert!(categories[0]["icons"].is_array());

    let resp = get!(app, "/api/icons?q=house");
    let matches: Vec<Value> = test::read_body_json(resp).await;
    assert!(matches.iter().any(|icon| icon["name"] == "Home"));
    assert!(matches.iter().all(|icon| icon.get("icons").is_none()));
}

// ============ Objects ============

#[actix_rt::test]
async fn test_image_upload_flow() {
    let dir = TempDir::new().unwrap();
    let ctx = test_context(&dir);
    let app = init_app!(ctx);

    let req = test::TestRequest::post().uri("/api/objects/upload").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let target: Value = test::read_body_json(resp).await;
    let upload_url = target["uploadURL"].as_str().unwrap().to_string();

    let req = test::TestRequest::put()
        .uri(&upload_url)
        .insert_header((header::CONTENT_TYPE, "image/png"))
        .set_payload(vec![0x89, b'P', b'N', b'G'])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let object_id = upload_url.rsplit('/').next().unwrap().to_string();
    let object_path = format!("/objects/uploads/{}", object_id);

    // 未公开前不可读
    let resp = get!(app, &object_path);
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::put()
        .uri("/api/images")
        .set_json(json!({"imageURL": upload_url}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["objectPath"], object_path.as_str());

    let resp = get!(app, &object_path);
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "image/png");
    let bytes = test::read_body(resp).await;
    assert_eq!(&bytes[..], &[0x89, b'P', b'N', b'G'][..]);

    let resp = get!(app, "/objects/uploads/../secret");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_finalize_rejects_non_image() {
    let dir = TempDir::new().unwrap();
    let ctx = test_context(&dir);
    let app = init_app!(ctx);

    let target = ctx.object_store.create_upload_target().await.unwrap();
    ctx.object_store
        .put(&target.object_id, "text/plain", b"hello")
        .await
        .unwrap();

    let req = test::TestRequest::put()
        .uri("/api/images")
        .set_json(json!({"imageURL": target.upload_url}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = get!(app, &format!("/objects/uploads/{}", target.object_id));
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_upload_to_unallocated_id_rejected() {
    let dir = TempDir::new().unwrap();
    let ctx = test_context(&dir);
    let app = init_app!(ctx);

    let stray = uuid::Uuid::new_v4();
    let req = test::TestRequest::put()
        .uri(&format!("/api/objects/upload/{}", stray))
        .insert_header((header::CONTENT_TYPE, "image/png"))
        .set_payload(vec![0x89, b'P', b'N', b'G'])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(!dir.path().join("uploads").join(stray.to_string()).exists());
}

// ============ Health ============

#[actix_rt::test]
async fn test_health_endpoints() {
    let dir = TempDir::new().unwrap();
    let ctx = test_context(&dir);
    let app = init_app!(ctx);

    let resp = get!(app, "/health");
    assert_eq!(resp.status(), StatusCode::OK);
    let report: Value = test::read_body_json(resp).await;
    assert_eq!(report["status"], "healthy");
    assert_eq!(report["storage"]["backend"], "memory");

    let resp = get!(app, "/health/ready");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = get!(app, "/health/live");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}
