//! 应用生命周期与运行模式
//!
//! - `lifetime`: 启动准备与优雅关闭
//! - `modes`: 运行模式入口（目前只有 HTTP 服务）

pub mod lifetime;
pub mod modes;

pub use modes::run_server;
