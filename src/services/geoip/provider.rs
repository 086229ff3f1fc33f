//! GeoIP 查询抽象
//!
//! 配置了可读的 MaxMind 数据库时启用本地解析，否则不做地理位置解析。

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::maxmind::MaxMindProvider;
use crate::config::AnalyticsConfig;
use crate::utils::ip::is_private_or_local;

/// 地理位置信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoInfo {
    /// ISO 3166-1 alpha-2 国家代码
    pub country: Option<String>,
    pub city: Option<String>,
}

/// GeoIP 查询 trait
#[async_trait]
pub trait GeoIpLookup: Send + Sync {
    /// 查询失败返回 `None`
    async fn lookup(&self, ip: IpAddr) -> Option<GeoInfo>;

    fn name(&self) -> &'static str;
}

/// GeoIP provider 工厂
pub struct GeoIpProvider;

impl GeoIpProvider {
    /// 根据配置构造查询器，未配置或加载失败时返回 `None`
    pub fn from_config(config: &AnalyticsConfig) -> Option<Arc<dyn GeoIpLookup>> {
        let Some(path) = config.maxminddb_path.as_deref().filter(|p| !p.is_empty()) else {
            debug!("GeoIP: No MaxMind database configured, geolocation disabled");
            return None;
        };

        match MaxMindProvider::new(path) {
            Ok(provider) => {
                info!("GeoIP: Using MaxMind database at {}", path);
                Some(Arc::new(provider))
            }
            Err(e) => {
                warn!(
                    "GeoIP: Failed to load MaxMind database at {}: {}, geolocation disabled",
                    path, e
                );
                None
            }
        }
    }
}

/// 公网地址才查询，私有和回环地址直接跳过
pub async fn lookup_public(lookup: &dyn GeoIpLookup, ip: IpAddr) -> GeoInfo {
    if is_private_or_local(&ip) {
        return GeoInfo::default();
    }
    lookup.lookup(ip).await.unwrap_or_default()
}
