use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::analytics::VisitRecorder;
use crate::config::StaticConfig;
use crate::services::{AnalyticsService, GeoIpProvider};
use crate::storage::{SeaOrmStorage, StorageFactory};

pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub analytics_service: Arc<AnalyticsService>,
    pub recorder: Arc<VisitRecorder>,
    pub route_config: RouteConfig,
}

#[derive(Clone, Debug)]
pub struct RouteConfig {
    pub admin_prefix: String,
    pub health_prefix: String,
}

/// 只读模式（CLI stats）需要的存储与统计服务
pub async fn prepare_analytics(config: &StaticConfig) -> Result<Arc<AnalyticsService>> {
    let storage = StorageFactory::create(&config.database)
        .await
        .context("Failed to create storage backend")?;

    Ok(Arc::new(
        AnalyticsService::new(storage).with_cache_ttl(config.analytics.stats_cache_ttl_secs),
    ))
}

/// 准备服务器启动的上下文
/// 包括存储、统计服务、访问记录器和路由配置
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let storage = StorageFactory::create(&config.database)
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", storage.get_backend_name());

    let analytics_service = Arc::new(
        AnalyticsService::new(storage.clone())
            .with_cache_ttl(config.analytics.stats_cache_ttl_secs),
    );

    let geoip = GeoIpProvider::from_config(&config.analytics);
    match &geoip {
        Some(provider) => info!("GeoIP lookup enabled ({})", provider.name()),
        None => debug!("GeoIP lookup disabled"),
    }

    let recorder = Arc::new(
        VisitRecorder::new(storage.as_visit_sink(), config.tracking.dedup_mode).with_geoip(geoip),
    );

    if config.tracking.enabled {
        info!(
            "Visit tracking enabled, dedup mode: {}",
            config.tracking.dedup_mode
        );
    } else {
        warn!("Visit tracking is disabled by configuration");
    }

    let route_config = RouteConfig {
        admin_prefix: config.routes.admin_prefix.clone(),
        health_prefix: config.routes.health_prefix.clone(),
    };

    if config.api.admin_token.is_empty() {
        warn!("Admin API is disabled (api.admin_token is empty)");
    } else {
        info!("Admin API available at: {}", route_config.admin_prefix);
    }
    info!("Health API available at: {}", route_config.health_prefix);

    debug!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        storage,
        analytics_service,
        recorder,
        route_config,
    })
}
