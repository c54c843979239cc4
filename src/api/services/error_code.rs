//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};
use ts_rs::TS;

use crate::errors::PortalError;
use crate::storage::models::TS_EXPORT_PATH;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字，ts-rs 生成 TypeScript 类型。
/// 按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 3000-3099: 内容树错误
/// - 4000-4099: 存储错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[ts(rename = "ErrorCode")]
#[ts(repr(enum))]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    ValidationFailed = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    InternalServerError = 1005,
    PayloadTooLarge = 1011,
    ServiceUnavailable = 1030,

    // 内容树错误 3000-3099
    TreeIntegrity = 3000,

    // 存储错误 4000-4099
    StorageError = 4000,
    FileStorageError = 4001,
    SerializationError = 4002,
}

impl From<&PortalError> for ErrorCode {
    fn from(err: &PortalError) -> Self {
        match err {
            PortalError::Validation(_) => ErrorCode::ValidationFailed,
            PortalError::NotFound(_) => ErrorCode::NotFound,
            PortalError::Forbidden(_) => ErrorCode::Forbidden,
            PortalError::TreeIntegrity(_) => ErrorCode::TreeIntegrity,
            PortalError::DatabaseConnection(_) => ErrorCode::ServiceUnavailable,
            PortalError::DatabaseConfig(_) | PortalError::DatabaseOperation(_) => {
                ErrorCode::StorageError
            }
            PortalError::FileOperation(_) => ErrorCode::FileStorageError,
            PortalError::Serialization(_) => ErrorCode::SerializationError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_number() {
        assert_eq!(serde_json::to_string(&ErrorCode::NotFound).unwrap(), "1004");
        assert_eq!(
            serde_json::from_str::<ErrorCode>("3000").unwrap(),
            ErrorCode::TreeIntegrity
        );
    }

    #[test]
    fn test_maps_portal_errors() {
        assert_eq!(
            ErrorCode::from(&PortalError::validation("x")),
            ErrorCode::ValidationFailed
        );
        assert_eq!(
            ErrorCode::from(&PortalError::database_operation("x")),
            ErrorCode::StorageError
        );
        assert_eq!(
            ErrorCode::from(&PortalError::tree_integrity("x")),
            ErrorCode::TreeIntegrity
        );
    }
}
