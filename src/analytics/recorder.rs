//! 访问记录器
//!
//! 每个请求最多写入一条访问记录。失败只记录日志，不向调用方传播。

use std::net::IpAddr;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, trace, warn};

use super::{NewVisit, VisitSink};
use crate::config::DedupMode;
use crate::errors::{OvencraftError, Result};
use crate::services::geoip::{GeoIpLookup, lookup_public};

pub const MAX_PAGE_LEN: usize = 255;
pub const MAX_SESSION_LEN: usize = 40;

/// 一次页面请求的原始信息
#[derive(Debug, Clone, Default)]
pub struct VisitRequest {
    pub client_address: String,
    pub user_agent: Option<String>,
    pub page_path: String,
    pub referrer: Option<String>,
    pub session_id: Option<String>,
}

/// 记录结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordResult {
    Recorded { id: i64 },
    Suppressed,
    Failed { reason: String },
}

impl RecordResult {
    pub fn is_recorded(&self) -> bool {
        matches!(self, RecordResult::Recorded { .. })
    }
}

pub struct VisitRecorder {
    sink: Arc<dyn VisitSink>,
    mode: DedupMode,
    geo: Option<Arc<dyn GeoIpLookup>>,
}

impl VisitRecorder {
    pub fn new(sink: Arc<dyn VisitSink>, mode: DedupMode) -> Self {
        Self {
            sink,
            mode,
            geo: None,
        }
    }

    pub fn with_geoip(mut self, geo: Option<Arc<dyn GeoIpLookup>>) -> Self {
        self.geo = geo;
        self
    }

    pub fn mode(&self) -> DedupMode {
        self.mode
    }

    /// 记录一次访问
    pub async fn record_visit(&self, request: VisitRequest) -> RecordResult {
        let page = request.page_path.clone();
        match self.try_record(request).await {
            Ok(result) => {
                trace!("Visit to {} -> {:?}", page, result);
                result
            }
            Err(e) => {
                warn!("Failed to record visit to {}: {}", page, e);
                RecordResult::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn try_record(&self, request: VisitRequest) -> Result<RecordResult> {
        let ip = validate_ip(&request.client_address)?;
        validate_page(&request.page_path)?;
        let session = normalize_session(request.session_id)?;
        let referrer = normalize_referrer(request.referrer);

        let mut visit = NewVisit::new(ip.to_string(), request.user_agent, request.page_path)
            .with_session(session)
            .with_referrer(referrer)
            .at(Utc::now());

        if let Some(geo) = &self.geo {
            let info = lookup_public(geo.as_ref(), ip).await;
            visit = visit.with_geo(info.country, info.city);
        }

        // 两种模式都先查已有记录，fingerprint 为空的旧记录也参与去重
        let exists = self
            .sink
            .visit_exists(&visit.visit_fingerprint())
            .await
            .map_err(|e| OvencraftError::database_operation(e.to_string()))?;
        if exists {
            debug!("Duplicate visit suppressed: {} {}", visit.ip_address, visit.page_visited);
            return Ok(RecordResult::Suppressed);
        }

        match self.mode {
            DedupMode::BestEffort => {
                // 检查与插入之间没有原子性，并发时可能重复计数
                let id = self
                    .sink
                    .insert_visit(visit)
                    .await
                    .map_err(|e| OvencraftError::database_operation(e.to_string()))?;
                Ok(RecordResult::Recorded { id })
            }
            DedupMode::Strict => {
                visit.fingerprint = Some(visit.visit_fingerprint().key());
                let inserted = self
                    .sink
                    .insert_visit_unique(visit)
                    .await
                    .map_err(|e| OvencraftError::database_operation(e.to_string()))?;
                Ok(match inserted {
                    Some(id) => RecordResult::Recorded { id },
                    None => RecordResult::Suppressed,
                })
            }
        }
    }
}

fn validate_ip(raw: &str) -> Result<IpAddr> {
    raw.trim()
        .parse::<IpAddr>()
        .map_err(|_| OvencraftError::validation(format!("Invalid client address: '{}'", raw)))
}

fn validate_page(page: &str) -> Result<()> {
    if page.is_empty() {
        return Err(OvencraftError::validation("Page path is empty"));
    }
    if !page.starts_with('/') {
        return Err(OvencraftError::validation(format!(
            "Page path must start with '/': '{}'",
            page
        )));
    }
    if page.chars().count() > MAX_PAGE_LEN {
        return Err(OvencraftError::validation(format!(
            "Page path exceeds {} characters",
            MAX_PAGE_LEN
        )));
    }
    Ok(())
}

fn normalize_session(session: Option<String>) -> Result<Option<String>> {
    match session {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) if s.chars().count() > MAX_SESSION_LEN => Err(OvencraftError::validation(
            format!("Session id exceeds {} characters", MAX_SESSION_LEN),
        )),
        Some(s) => Ok(Some(s)),
    }
}

/// 只保留可解析的绝对 URL
fn normalize_referrer(referrer: Option<String>) -> Option<String> {
    referrer.filter(|r| url::Url::parse(r).is_ok())
}
