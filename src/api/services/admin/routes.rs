//! Admin API 路由配置

use actix_web::web;

use super::analytics::analytics_routes;

/// `/v1` 下的全部 Admin 路由
pub fn v1_routes() -> actix_web::Scope {
    web::scope("/v1").service(analytics_routes())
}
