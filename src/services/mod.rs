//! Service layer for business logic
//!
//! HTTP handlers stay thin; validation, referential checks and analytics
//! aggregation live here.

mod analytics_service;
mod content_service;
pub mod health;
pub mod icons;
mod object_service;
pub mod theme_templates;

pub use analytics_service::*;
pub use content_service::*;
pub use health::{AppStartTime, HealthReport, check_health};
pub use object_service::*;
pub use theme_templates::{ThemeTemplate, theme_templates};
