//! HTTP 接口层
//!
//! - `services`: 路由与处理函数
//! - `middleware`: 请求级中间件

pub mod middleware;
pub mod services;
