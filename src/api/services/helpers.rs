//! API 帮助函数

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Serialize;
use tracing::{error, trace};

use crate::errors::PortalError;

use super::error_code::ErrorCode;
use super::types::ErrorBody;

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(body)
}

/// 200 + 实体本身
pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, &data)
}

/// 构建错误响应
pub fn error_response(status: StatusCode, code: ErrorCode, message: &str) -> HttpResponse {
    json_response(
        status,
        &ErrorBody {
            code,
            message: message.to_string(),
        },
    )
}

/// 从 PortalError 构建错误响应（自动映射 HTTP 状态码和 ErrorCode）
pub fn error_from_portal(err: &PortalError) -> HttpResponse {
    let status = err.http_status();
    if status.is_server_error() {
        error!("API error: {}", err);
    } else {
        trace!("API rejected request: {}", err);
    }
    error_response(status, ErrorCode::from(err), err.message())
}

/// 统一 Result → HttpResponse 转换，成功时 200
pub fn api_result<T: Serialize>(result: Result<T, PortalError>) -> HttpResponse {
    match result {
        Ok(data) => success_response(data),
        Err(e) => error_from_portal(&e),
    }
}

/// 创建类接口，成功时 201
pub fn created_result<T: Serialize>(result: Result<T, PortalError>) -> HttpResponse {
    match result {
        Ok(data) => json_response(StatusCode::CREATED, &data),
        Err(e) => error_from_portal(&e),
    }
}

/// 删除类接口：删除成功 204，不存在 404
pub fn deleted_result(result: Result<bool, PortalError>, what: &str, id: &str) -> HttpResponse {
    match result {
        Ok(true) => HttpResponse::NoContent().finish(),
        Ok(false) => error_response(
            StatusCode::NOT_FOUND,
            ErrorCode::NotFound,
            &format!("{} not found: {}", what, id),
        ),
        Err(e) => error_from_portal(&e),
    }
}

fn bad_request(message: String) -> actix_web::Error {
    actix_web::error::InternalError::from_response(
        message.clone(),
        error_response(StatusCode::BAD_REQUEST, ErrorCode::BadRequest, &message),
    )
    .into()
}

/// JSON 解析失败时返回统一错误体
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
            if let JsonPayloadError::Overflow { limit }
            | JsonPayloadError::OverflowKnownLength { limit, .. } = &err
            {
                let message = format!("JSON payload exceeds {} bytes", limit);
                return actix_web::error::InternalError::from_response(
                    message.clone(),
                    error_response(
                        StatusCode::PAYLOAD_TOO_LARGE,
                        ErrorCode::PayloadTooLarge,
                        &message,
                    ),
                )
                .into();
            }
            bad_request(format!("Invalid JSON body: {}", err))
        })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: QueryPayloadError, _req: &HttpRequest| {
        bad_request(format!("Invalid query string: {}", err))
    })
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err: PathError, _req: &HttpRequest| {
        bad_request(format!("Invalid path: {}", err))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_from_portal_status() {
        let resp = error_from_portal(&PortalError::validation("name is required"));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = error_from_portal(&PortalError::tree_integrity("cycle"));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let resp = error_from_portal(&PortalError::forbidden("private"));
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_deleted_result() {
        assert_eq!(
            deleted_result(Ok(true), "Link", "l1").status(),
            StatusCode::NO_CONTENT
        );
        assert_eq!(
            deleted_result(Ok(false), "Link", "l1").status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_created_result() {
        assert_eq!(created_result(Ok("x")).status(), StatusCode::CREATED);
    }
}
