//! Admin API 服务模块
//!
//! 目前只包含访问统计相关端点，统一由 Bearer token 保护。

pub mod analytics;
pub mod error_code;
mod helpers;
pub mod routes;
mod types;

pub use types::*;

pub use helpers::{api_result, error_from_ovencraft, error_response, json_response, success_response};

pub use error_code::ErrorCode;

pub use routes::v1_routes;
