pub mod classify;
pub mod recorder;
pub mod sink;

pub use classify::{BrowserFamily, DeviceClass, classify_browser, classify_device};
pub use recorder::{RecordResult, VisitRecorder, VisitRequest};
pub use sink::VisitSink;

use chrono::{DateTime, Utc};
use serde::Serialize;
use xxhash_rust::xxh64::xxh64;

/// 已持久化的访问记录（只读）
#[derive(Debug, Clone, Serialize)]
pub struct VisitRecord {
    pub id: i64,
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub page_visited: String,
    pub referrer: Option<String>,
    pub session_key: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub device_type: String,
    pub browser: String,
    pub visited_at: DateTime<Utc>,
}

/// 待写入的访问记录
#[derive(Debug, Clone)]
pub struct NewVisit {
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub page_visited: String,
    pub referrer: Option<String>,
    pub session_key: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub device: DeviceClass,
    pub browser: BrowserFamily,
    /// 仅 strict 模式下写入
    pub fingerprint: Option<String>,
    pub visited_at: DateTime<Utc>,
}

impl NewVisit {
    /// 按 UA 分类构造一条访问，时间取当前时刻
    pub fn new(
        ip_address: impl Into<String>,
        user_agent: Option<String>,
        page_visited: impl Into<String>,
    ) -> Self {
        let device = classify_device(user_agent.as_deref());
        let browser = classify_browser(user_agent.as_deref());
        Self {
            ip_address: ip_address.into(),
            user_agent,
            page_visited: page_visited.into(),
            referrer: None,
            session_key: None,
            country: None,
            city: None,
            device,
            browser,
            fingerprint: None,
            visited_at: Utc::now(),
        }
    }

    pub fn with_session(mut self, session_key: Option<String>) -> Self {
        self.session_key = session_key;
        self
    }

    pub fn with_referrer(mut self, referrer: Option<String>) -> Self {
        self.referrer = referrer;
        self
    }

    pub fn with_geo(mut self, country: Option<String>, city: Option<String>) -> Self {
        self.country = country;
        self.city = city;
        self
    }

    pub fn at(mut self, visited_at: DateTime<Utc>) -> Self {
        self.visited_at = visited_at;
        self
    }

    /// 当前记录的去重指纹
    pub fn visit_fingerprint(&self) -> VisitFingerprint {
        VisitFingerprint {
            ip_address: self.ip_address.clone(),
            session_key: self.session_key.clone(),
            page_visited: self.page_visited.clone(),
        }
    }
}

/// 访问指纹：(客户端地址, 会话, 路径)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VisitFingerprint {
    pub ip_address: String,
    pub session_key: Option<String>,
    pub page_visited: String,
}

const FIELD_SEP: char = '\u{1f}';
// 会话 Cookie 值不会包含控制字符，和任何真实会话都不冲突
const NO_SESSION_MARKER: &str = "\u{0}none";

impl VisitFingerprint {
    /// 16 位十六进制的 xxh64 摘要，用于唯一索引
    pub fn key(&self) -> String {
        let session = self.session_key.as_deref().unwrap_or(NO_SESSION_MARKER);
        let raw = format!(
            "{}{sep}{}{sep}{}",
            self.ip_address,
            session,
            self.page_visited,
            sep = FIELD_SEP
        );
        format!("{:016x}", xxh64(raw.as_bytes(), 0))
    }
}
