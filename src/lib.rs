//! portalkit - backend for a multi-tenant portal builder
//!
//! Themes, a hierarchical tree of subsites with their links, simple
//! view/click analytics and image uploads, served as a JSON HTTP API.
//!
//! # Architecture
//! - `storage`: content/event store traits, SeaORM and in-memory backends
//! - `services`: validation, tree rules, analytics aggregation, object store
//! - `api`: HTTP handlers and middleware
//! - `config`: static configuration (TOML + environment)
//! - `runtime`: server startup and graceful shutdown
//! - `system`: logging

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
