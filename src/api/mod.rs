//! HTTP 层：中间件与路由
pub mod middleware;
pub mod services;
