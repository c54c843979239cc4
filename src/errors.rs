use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum PortalError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Validation(String),
    NotFound(String),
    Forbidden(String),
    Serialization(String),
    TreeIntegrity(String),
}

impl PortalError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            PortalError::DatabaseConfig(_) => "E001",
            PortalError::DatabaseConnection(_) => "E002",
            PortalError::DatabaseOperation(_) => "E003",
            PortalError::FileOperation(_) => "E004",
            PortalError::Validation(_) => "E005",
            PortalError::NotFound(_) => "E006",
            PortalError::Forbidden(_) => "E007",
            PortalError::Serialization(_) => "E008",
            PortalError::TreeIntegrity(_) => "E009",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            PortalError::DatabaseConfig(_) => "Database Configuration Error",
            PortalError::DatabaseConnection(_) => "Database Connection Error",
            PortalError::DatabaseOperation(_) => "Database Operation Error",
            PortalError::FileOperation(_) => "File Operation Error",
            PortalError::Validation(_) => "Validation Error",
            PortalError::NotFound(_) => "Resource Not Found",
            PortalError::Forbidden(_) => "Forbidden",
            PortalError::Serialization(_) => "Serialization Error",
            PortalError::TreeIntegrity(_) => "Tree Integrity Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            PortalError::DatabaseConfig(msg)
            | PortalError::DatabaseConnection(msg)
            | PortalError::DatabaseOperation(msg)
            | PortalError::FileOperation(msg)
            | PortalError::Validation(msg)
            | PortalError::NotFound(msg)
            | PortalError::Forbidden(msg)
            | PortalError::Serialization(msg)
            | PortalError::TreeIntegrity(msg) => msg,
        }
    }

    /// 映射到 HTTP 状态码
    pub fn http_status(&self) -> StatusCode {
        match self {
            PortalError::Validation(_) => StatusCode::BAD_REQUEST,
            PortalError::NotFound(_) => StatusCode::NOT_FOUND,
            PortalError::Forbidden(_) => StatusCode::FORBIDDEN,
            PortalError::DatabaseConnection(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为彩色输出（用于启动失败）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for PortalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for PortalError {}

// 便捷的构造函数
impl PortalError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        PortalError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        PortalError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        PortalError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        PortalError::FileOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        PortalError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        PortalError::NotFound(msg.into())
    }

    pub fn forbidden<T: Into<String>>(msg: T) -> Self {
        PortalError::Forbidden(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        PortalError::Serialization(msg.into())
    }

    pub fn tree_integrity<T: Into<String>>(msg: T) -> Self {
        PortalError::TreeIntegrity(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for PortalError {
    fn from(err: sea_orm::DbErr) -> Self {
        PortalError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for PortalError {
    fn from(err: std::io::Error) -> Self {
        PortalError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for PortalError {
    fn from(err: serde_json::Error) -> Self {
        PortalError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PortalError>;
