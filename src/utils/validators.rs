//! 输入校验
//!
//! URL 只允许 http/https；自定义域名按 `sub.example.com` 形式校验。

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::errors::PortalError;

/// URL 校验错误
#[derive(Debug, PartialEq, Eq)]
pub enum UrlValidationError {
    Empty,
    DangerousScheme(String),
    UnsupportedScheme(String),
    Malformed(String),
}

impl std::fmt::Display for UrlValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "URL cannot be empty"),
            Self::DangerousScheme(scheme) => write!(f, "URL scheme not allowed: {}", scheme),
            Self::UnsupportedScheme(scheme) => {
                write!(f, "URL must use http or https, got {}", scheme)
            }
            Self::Malformed(msg) => write!(f, "Invalid URL: {}", msg),
        }
    }
}

impl std::error::Error for UrlValidationError {}

/// 直接拒绝的协议
const BLOCKED_SCHEMES: &[&str] = &["javascript", "data", "file", "vbscript", "about", "blob"];

static DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([a-z0-9]+(-[a-z0-9]+)*\.)+[a-z]{2,}$").expect("domain pattern is valid")
});

/// 校验外部链接地址
pub fn validate_url(raw: &str) -> Result<Url, UrlValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(UrlValidationError::Empty);
    }
    // Url::parse 会静默丢弃换行与制表符，原文随后无法作为 Location 头写出
    if raw.chars().any(char::is_control) {
        return Err(UrlValidationError::Malformed(
            "contains control characters".to_string(),
        ));
    }

    let parsed = Url::parse(raw).map_err(|e| {
        // 解析失败时仍优先报告危险协议
        let scheme = raw.split(':').next().unwrap_or_default().to_lowercase();
        if BLOCKED_SCHEMES.contains(&scheme.as_str()) {
            UrlValidationError::DangerousScheme(scheme)
        } else {
            UrlValidationError::Malformed(e.to_string())
        }
    })?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme if BLOCKED_SCHEMES.contains(&scheme) => {
            return Err(UrlValidationError::DangerousScheme(scheme.to_string()));
        }
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_string())),
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::Malformed("missing host".to_string()));
    }

    Ok(parsed)
}

/// 可选 URL：None 或空白字符串视为未设置
pub fn normalize_optional_url(
    field: &str,
    value: Option<String>,
) -> Result<Option<String>, PortalError> {
    match value.map(|v| v.trim().to_string()) {
        None => Ok(None),
        Some(v) if v.is_empty() => Ok(None),
        Some(v) => {
            validate_url(&v).map_err(|e| PortalError::validation(format!("{}: {}", field, e)))?;
            Ok(Some(v))
        }
    }
}

/// 自定义域名校验（不含协议与路径）
pub fn is_valid_domain(domain: &str) -> bool {
    domain.len() <= 253 && DOMAIN_RE.is_match(domain)
}

/// 必填文本：去除首尾空白后不能为空
pub fn require_non_empty(field: &str, value: &str) -> Result<String, PortalError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PortalError::validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// 可选文本：空白字符串视为未设置
pub fn normalize_optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_http_and_https() {
        assert!(validate_url("https://example.com/path?q=1").is_ok());
        assert!(validate_url("http://localhost:5000").is_ok());
        assert!(validate_url("  HTTPS://Example.com  ").is_ok());
    }

    #[test]
    fn test_rejects_dangerous_schemes() {
        assert!(matches!(
            validate_url("javascript:alert(1)"),
            Err(UrlValidationError::DangerousScheme(_))
        ));
        assert!(matches!(
            validate_url("DATA:text/html,hi"),
            Err(UrlValidationError::DangerousScheme(_))
        ));
    }

    #[test]
    fn test_rejects_other_schemes_and_garbage() {
        assert!(matches!(
            validate_url("ftp://example.com"),
            Err(UrlValidationError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            validate_url("not a url"),
            Err(UrlValidationError::Malformed(_))
        ));
        assert_eq!(validate_url("   "), Err(UrlValidationError::Empty));
    }

    #[test]
    fn test_rejects_control_characters() {
        for raw in [
            "https://example.com/a\nb",
            "https://exa\tmple.com",
            "https://example.com/\r\nSet-Cookie: x=1",
            "https://example.com/\u{7f}",
        ] {
            assert_eq!(
                validate_url(raw),
                Err(UrlValidationError::Malformed(
                    "contains control characters".to_string()
                ))
            );
        }
        // 首尾空白仍然允许
        assert!(validate_url("\thttps://example.com/\n").is_ok());
    }

    #[test]
    fn test_optional_url_treats_blank_as_absent() {
        assert_eq!(normalize_optional_url("url", Some("".to_string())).unwrap(), None);
        assert_eq!(normalize_optional_url("url", None).unwrap(), None);
        assert!(normalize_optional_url("url", Some("nope".to_string())).is_err());
    }

    #[test]
    fn test_domains() {
        assert!(is_valid_domain("example.com"));
        assert!(is_valid_domain("sub.example.com"));
        assert!(is_valid_domain("My-Portal.Example.ORG"));
        assert!(!is_valid_domain("localhost"));
        assert!(!is_valid_domain("https://example.com"));
        assert!(!is_valid_domain("-bad.example.com"));
        assert!(!is_valid_domain("example.c"));
        assert!(!is_valid_domain("exa mple.com"));
    }

    #[test]
    fn test_require_non_empty() {
        assert_eq!(require_non_empty("name", "  Sales ").unwrap(), "Sales");
        assert!(require_non_empty("name", "   ").is_err());
    }
}
