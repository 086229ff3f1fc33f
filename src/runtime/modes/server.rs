//! Server mode
//!
//! 组装 HTTP 服务：Admin API、健康检查，以及被访问追踪中间件包裹的站点页面。

use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::warn;

use crate::analytics::VisitRecorder;
use crate::api::middleware::{AdminAuth, RequestIdMiddleware, VisitTracking};
use crate::api::services::admin::v1_routes;
use crate::api::services::{AppStartTime, PageService, health_routes, page_routes};
use crate::config::{StaticConfig, TrackingConfig};
use crate::runtime::lifetime;
use crate::runtime::lifetime::startup::RouteConfig;
use crate::services::AnalyticsService;
use crate::storage::SeaOrmStorage;

/// 每个 worker 共享的应用状态
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<SeaOrmStorage>,
    pub analytics_service: Arc<AnalyticsService>,
    pub recorder: Arc<VisitRecorder>,
    pub tracking: TrackingConfig,
    pub routes: RouteConfig,
    pub admin_token: String,
    pub start_time: AppStartTime,
}

/// 注册全部路由与共享数据
///
/// 顺序：Admin scope → Health scope → 站点页面（兜底 404 同样经过追踪中间件，
/// 但 4xx 响应不会被记录）
pub fn configure_app(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.app_data(web::Data::new(state.storage.clone()))
        .app_data(web::Data::new(state.analytics_service.clone()))
        .app_data(web::Data::new(state.start_time.clone()))
        .service(
            web::scope(&state.routes.admin_prefix)
                .service(v1_routes())
                .wrap(AdminAuth::new(&state.admin_token)),
        )
        .service(web::scope(&state.routes.health_prefix).service(health_routes()))
        .service(
            web::scope("")
                .configure(page_routes)
                .default_service(web::route().to(PageService::not_found))
                .wrap(VisitTracking::new(
                    state.recorder.clone(),
                    state.tracking.clone(),
                )),
        );
}

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(config: Arc<StaticConfig>) -> Result<()> {
    let app_start_time = AppStartTime::now();

    let startup = lifetime::startup::prepare_server_startup(&config)
        .await
        .map_err(|e| {
            tracing::error!("Server startup failed: {}", e);
            e
        })?;

    let state = AppState {
        storage: startup.storage.clone(),
        analytics_service: startup.analytics_service.clone(),
        recorder: startup.recorder.clone(),
        tracking: config.tracking.clone(),
        routes: startup.route_config.clone(),
        admin_token: config.api.admin_token.clone(),
        start_time: app_start_time,
    };

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    // HttpServer 闭包会拿走 storage，先克隆一份连接用于关闭
    let db_for_shutdown = startup.storage.get_db().clone();

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);

    let server = HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("Cache-Control", "no-cache, no-store, must-revalidate")),
            )
            .configure(move |cfg| configure_app(cfg, &state))
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .client_disconnect_timeout(std::time::Duration::from_millis(1000))
    .workers(cpu_count)
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    tokio::select! {
        res = server => {
            res.context("HTTP server error")?;
        }
        _ = lifetime::shutdown::listen_for_shutdown(&db_for_shutdown) => {
            warn!("Graceful shutdown completed");
        }
    }

    Ok(())
}
