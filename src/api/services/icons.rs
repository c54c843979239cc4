use actix_web::{HttpResponse, web};

use crate::services::icons::{ICON_LIBRARY, search_icons};

use super::helpers::success_response;
use super::types::{IconQuery, IconsResponse};

pub async fn list_icons(query: web::Query<IconQuery>) -> HttpResponse {
    let response = match query.q.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => IconsResponse::Matches(search_icons(q)),
        _ => IconsResponse::Categories(ICON_LIBRARY),
    };
    success_response(response)
}

pub fn icons_routes() -> actix_web::Scope {
    web::scope("/icons").route("", web::get().to(list_icons))
}
