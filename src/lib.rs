//! OvenCraft - visitor tracking and dashboard analytics
//!
//! 记录站点页面访问（按 IP / 会话 / 页面去重），并为 Admin 后台提供访客统计。
//!
//! # Features
//! - **server**: HTTP server mode (default)
//! - **cli**: Command-line interface
//!
//! # Architecture
//! - `analytics`: 访问记录器与 UA 分类
//! - `storage`: SeaORM 存储后端与统计查询
//! - `services`: 统计服务与 GeoIP
//! - `api`: HTTP 中间件与路由
//! - `config`: 配置加载
//! - `runtime`: 启动、关闭与运行模式
//! - `system`: 日志初始化

pub mod analytics;
pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
