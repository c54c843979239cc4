pub mod analytics;
pub mod error_code;
pub mod health;
mod helpers;
pub mod icons;
pub mod links;
pub mod objects;
pub mod redirect;
pub mod routes;
pub mod subsites;
pub mod themes;
mod types;

pub use error_code::ErrorCode;
pub use health::{HealthService, health_routes};
pub use helpers::{
    api_result, error_from_portal, error_response, json_config, path_config, query_config,
    success_response,
};
pub use objects::object_serving_routes;
pub use redirect::{RedirectService, redirect_routes};
pub use routes::{api_routes, configure_routes};
pub use types::*;
