pub mod validators;

pub use validators::{
    UrlValidationError, is_valid_domain, normalize_optional_text, normalize_optional_url,
    require_non_empty, validate_url,
};
