//! 业务服务层，HTTP API 与 CLI 共用

mod analytics_service;
pub mod geoip;

pub use analytics_service::*;
pub use geoip::{GeoInfo, GeoIpLookup, GeoIpProvider};
