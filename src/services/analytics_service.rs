//! 访问统计服务
//!
//! 只读的统计查询层，供 Admin API 与 CLI 共用。所有查询都是 `now` 与
//! 已存储数据的纯函数，除可选的 dashboard 快照缓存外不保存状态。

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use futures_util::future::try_join_all;
use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use tracing::{debug, error, info};

use crate::analytics::{BrowserFamily, DeviceClass, VisitRecord};
use crate::errors::{OvencraftError, Result};
use crate::storage::{GroupColumn, SeaOrmStorage, VisitQuery};

/// pages 维度只返回前 N 条
pub const TOP_PAGES_LIMIT: u64 = 10;
/// dashboard 默认趋势天数
pub const DEFAULT_TREND_DAYS: u32 = 7;
pub const MAX_PAGE_SIZE: u64 = 200;

const DASHBOARD_CACHE_KEY: &str = "dashboard";

// ============ 公共类型定义 ============

/// 统计窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitorWindow {
    /// `now` 所在的 UTC 自然日
    Today,
    /// `[now - 7d, now]`
    Week,
    /// `[now - 30d, now]`
    Month,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WindowBounds {
    HalfOpen(DateTime<Utc>, DateTime<Utc>),
    Closed(DateTime<Utc>, DateTime<Utc>),
}

impl VisitorWindow {
    fn bounds(self, now: DateTime<Utc>) -> WindowBounds {
        match self {
            VisitorWindow::Today => {
                let start = day_start(now.date_naive());
                WindowBounds::HalfOpen(start, start + Duration::days(1))
            }
            VisitorWindow::Week => WindowBounds::Closed(now - Duration::days(7), now),
            VisitorWindow::Month => WindowBounds::Closed(now - Duration::days(30), now),
        }
    }
}

/// 不同访客数汇总
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorStats {
    pub today: u64,
    pub week: u64,
    pub month: u64,
    pub total: u64,
}

/// 分组维度
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GroupDimension {
    Device,
    Browser,
    Page,
}

impl GroupDimension {
    fn column(self) -> GroupColumn {
        match self {
            GroupDimension::Device => GroupColumn::DeviceType,
            GroupDimension::Browser => GroupColumn::Browser,
            GroupDimension::Page => GroupColumn::PageVisited,
        }
    }

    fn limit(self) -> Option<u64> {
        match self {
            GroupDimension::Page => Some(TOP_PAGES_LIMIT),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCount {
    pub value: String,
    pub count: u64,
}

/// 单日不同访客数，日期序列化为 `YYYY-MM-DD`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u64,
}

/// Dashboard 快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    pub visitors: VisitorStats,
    pub devices: Vec<GroupCount>,
    pub browsers: Vec<GroupCount>,
    pub pages: Vec<GroupCount>,
    pub trend: Vec<DailyCount>,
}

impl DashboardSnapshot {
    /// 全零快照，趋势为截至 `now` 的 7 个零值日
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            generated_at: now,
            visitors: VisitorStats::default(),
            devices: Vec::new(),
            browsers: Vec::new(),
            pages: Vec::new(),
            trend: trend_dates(now, DEFAULT_TREND_DAYS)
                .into_iter()
                .map(|date| DailyCount { date, count: 0 })
                .collect(),
        }
    }
}

/// 访问日志过滤条件
#[derive(Debug, Clone, Default)]
pub struct VisitFilter {
    pub device: Option<DeviceClass>,
    pub browser: Option<BrowserFamily>,
    pub search: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<EndBound>,
}

/// 访问日志时间范围的上界
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndBound {
    /// visited_at <= t
    Inclusive(DateTime<Utc>),
    /// visited_at < t，纯日期的结束日取次日零点
    Before(DateTime<Utc>),
}

impl EndBound {
    /// `t` 是否落在上界以内
    pub fn admits(&self, t: DateTime<Utc>) -> bool {
        match *self {
            EndBound::Inclusive(end) => t <= end,
            EndBound::Before(end) => t < end,
        }
    }
}

impl From<&VisitFilter> for VisitQuery {
    fn from(filter: &VisitFilter) -> Self {
        VisitQuery {
            device: filter.device.map(|d| d.as_ref().to_string()),
            browser: filter.browser.map(|b| b.as_ref().to_string()),
            search: filter
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
            start: filter.start,
            end: match filter.end {
                Some(EndBound::Inclusive(t)) => Some(t),
                _ => None,
            },
            before: match filter.end {
                Some(EndBound::Before(t)) => Some(t),
                _ => None,
            },
        }
    }
}

/// 访问日志分页结果
#[derive(Debug, Clone, Serialize)]
pub struct VisitPage {
    pub items: Vec<VisitRecord>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// 截至 `now` 所在日（含）的最近 `days` 天，升序
fn trend_dates(now: DateTime<Utc>, days: u32) -> Vec<NaiveDate> {
    let today = now.date_naive();
    let mut dates: Vec<NaiveDate> = (0..days as i64)
        .map(|offset| today - Duration::days(offset))
        .collect();
    dates.reverse();
    dates
}

// ============ AnalyticsService ============

pub struct AnalyticsService {
    storage: Arc<SeaOrmStorage>,
    cache: Option<Cache<&'static str, DashboardSnapshot>>,
}

impl AnalyticsService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self {
            storage,
            cache: None,
        }
    }

    /// 启用 dashboard 快照缓存，`ttl_secs` 为 0 时不缓存
    pub fn with_cache_ttl(mut self, ttl_secs: u64) -> Self {
        self.cache = (ttl_secs > 0).then(|| {
            Cache::builder()
                .max_capacity(4)
                .time_to_live(StdDuration::from_secs(ttl_secs))
                .build()
        });
        self
    }

    /// 窗口内的不同访客数
    pub async fn distinct_visitors_in_window(
        &self,
        now: DateTime<Utc>,
        window: VisitorWindow,
    ) -> Result<u64> {
        let result = match window.bounds(now) {
            WindowBounds::HalfOpen(start, end) => {
                self.storage.count_distinct_ips_half_open(start, end).await
            }
            WindowBounds::Closed(start, end) => {
                self.storage.count_distinct_ips_between(start, end).await
            }
        };

        result.map_err(|e| {
            OvencraftError::analytics_query_failed(format!(
                "Visitor count ({:?}) failed: {}",
                window, e
            ))
        })
    }

    /// 全部时间的不同访客数
    pub async fn total_distinct_visitors(&self) -> Result<u64> {
        self.storage
            .count_distinct_ips_total()
            .await
            .map_err(|e| {
                OvencraftError::analytics_query_failed(format!("Visitor count failed: {}", e))
            })
    }

    /// 并发查询 today / week / month / total
    pub async fn visitor_stats(&self, now: DateTime<Utc>) -> Result<VisitorStats> {
        debug!("Analytics: visitor_stats at {}", now);

        let (today, week, month, total) = tokio::try_join!(
            self.distinct_visitors_in_window(now, VisitorWindow::Today),
            self.distinct_visitors_in_window(now, VisitorWindow::Week),
            self.distinct_visitors_in_window(now, VisitorWindow::Month),
            self.total_distinct_visitors(),
        )?;

        Ok(VisitorStats {
            today,
            week,
            month,
            total,
        })
    }

    /// 按维度分组计数，数量降序；page 维度只取前 10
    pub async fn grouped_counts(&self, dimension: GroupDimension) -> Result<Vec<GroupCount>> {
        let rows = self
            .storage
            .group_counts(dimension.column(), dimension.limit())
            .await
            .map_err(|e| {
                OvencraftError::analytics_query_failed(format!(
                    "Group query ({}) failed: {}",
                    dimension, e
                ))
            })?;

        debug!(
            "Analytics: grouped_counts({}) returned {} groups",
            dimension,
            rows.len()
        );

        Ok(rows
            .into_iter()
            .map(|row| GroupCount {
                value: row.value,
                count: row.count.max(0) as u64,
            })
            .collect())
    }

    /// 最近 `days` 个 UTC 自然日的不同访客数，按日期升序
    pub async fn daily_trend(&self, now: DateTime<Utc>, days: u32) -> Result<Vec<DailyCount>> {
        if days == 0 {
            return Ok(Vec::new());
        }

        // 由近及远查询，最后翻转为升序
        let today = now.date_naive();
        let newest_first: Vec<NaiveDate> = (0..days as i64)
            .map(|offset| today - Duration::days(offset))
            .collect();

        let counts = try_join_all(newest_first.iter().map(|date| {
            let start = day_start(*date);
            self.storage
                .count_distinct_ips_half_open(start, start + Duration::days(1))
        }))
        .await
        .map_err(|e| OvencraftError::analytics_query_failed(format!("Trend query failed: {}", e)))?;

        let mut trend: Vec<DailyCount> = newest_first
            .into_iter()
            .zip(counts)
            .map(|(date, count)| DailyCount { date, count })
            .collect();
        trend.reverse();

        Ok(trend)
    }

    /// 汇总 dashboard 所需的全部统计
    pub async fn dashboard(&self, now: DateTime<Utc>) -> Result<DashboardSnapshot> {
        if let Some(cache) = &self.cache
            && let Some(snapshot) = cache.get(DASHBOARD_CACHE_KEY)
        {
            debug!("Analytics: dashboard served from cache");
            return Ok(snapshot);
        }

        info!("Analytics: building dashboard snapshot at {}", now);

        let (visitors, devices, browsers, pages, trend) = tokio::try_join!(
            self.visitor_stats(now),
            self.grouped_counts(GroupDimension::Device),
            self.grouped_counts(GroupDimension::Browser),
            self.grouped_counts(GroupDimension::Page),
            self.daily_trend(now, DEFAULT_TREND_DAYS),
        )?;

        let snapshot = DashboardSnapshot {
            generated_at: now,
            visitors,
            devices,
            browsers,
            pages,
            trend,
        };

        if let Some(cache) = &self.cache {
            cache.insert(DASHBOARD_CACHE_KEY, snapshot.clone());
        }

        Ok(snapshot)
    }

    /// 查询失败时返回全零快照
    pub async fn dashboard_or_default(&self, now: DateTime<Utc>) -> DashboardSnapshot {
        match self.dashboard(now).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("Analytics: dashboard query failed, using empty snapshot: {}", e);
                DashboardSnapshot::empty(now)
            }
        }
    }

    /// 分页查询访问日志，最新的在前
    pub async fn list_visits(
        &self,
        filter: &VisitFilter,
        page: u64,
        page_size: u64,
    ) -> Result<VisitPage> {
        if let (Some(start), Some(end)) = (filter.start, filter.end)
            && !end.admits(start)
        {
            return Err(OvencraftError::analytics_invalid_date_range(
                "Start date must not be later than end date",
            ));
        }

        let page = page.max(1);
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);

        let (items, total) = self
            .storage
            .load_visits_paginated(&VisitQuery::from(filter), page, page_size)
            .await
            .map_err(|e| {
                OvencraftError::analytics_query_failed(format!("Visit log query failed: {}", e))
            })?;

        Ok(VisitPage {
            items,
            total,
            page,
            page_size,
            total_pages: total.div_ceil(page_size),
        })
    }

    /// 解析起始日期，支持 RFC3339 与 YYYY-MM-DD（取当天零点）
    pub fn parse_date(s: &str) -> Result<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.with_timezone(&Utc));
        }
        let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")?;
        Ok(day_start(date))
    }

    /// 解析结束日期
    ///
    /// RFC3339 时间点为闭区间上界；纯日期包含当天全部记录，即 `< 次日零点`
    pub fn parse_end_date(s: &str) -> Result<EndBound> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(EndBound::Inclusive(dt.with_timezone(&Utc)));
        }
        let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")?;
        Ok(EndBound::Before(day_start(date) + Duration::days(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_window_bounds() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 30, 0).unwrap();

        assert_eq!(
            VisitorWindow::Today.bounds(now),
            WindowBounds::HalfOpen(
                Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2026, 3, 16, 0, 0, 0).unwrap(),
            )
        );
        assert_eq!(
            VisitorWindow::Week.bounds(now),
            WindowBounds::Closed(Utc.with_ymd_and_hms(2026, 3, 8, 12, 30, 0).unwrap(), now)
        );
        assert_eq!(
            VisitorWindow::Month.bounds(now),
            WindowBounds::Closed(Utc.with_ymd_and_hms(2026, 2, 13, 12, 30, 0).unwrap(), now)
        );
    }

    #[test]
    fn test_empty_snapshot_has_seven_ascending_days() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let snapshot = DashboardSnapshot::empty(now);

        assert_eq!(snapshot.visitors, VisitorStats::default());
        assert_eq!(snapshot.trend.len(), 7);
        assert_eq!(
            snapshot.trend.first().map(|d| d.date),
            NaiveDate::from_ymd_opt(2026, 2, 23)
        );
        assert_eq!(snapshot.trend.last().map(|d| d.date), Some(now.date_naive()));
        assert!(snapshot.trend.iter().all(|d| d.count == 0));
    }

    #[test]
    fn test_daily_count_serializes_plain_date() {
        let day = DailyCount {
            date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            count: 3,
        };
        let json = serde_json::to_value(day).unwrap();
        assert_eq!(json["date"], "2026-01-05");
        assert_eq!(json["count"], 3);
    }

    #[test]
    fn test_parse_date() {
        let start = AnalyticsService::parse_date("2026-03-01").unwrap();
        let end = AnalyticsService::parse_end_date("2026-03-01").unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(
            end,
            EndBound::Before(Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap())
        );

        let rfc = AnalyticsService::parse_end_date("2026-03-01T10:00:00+02:00").unwrap();
        assert_eq!(
            rfc,
            EndBound::Inclusive(Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap())
        );

        assert!(matches!(
            AnalyticsService::parse_date("03/01/2026"),
            Err(OvencraftError::DateParse(_))
        ));
    }

    #[test]
    fn test_end_bound_admits() {
        let midnight = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();
        let last_instant = midnight - Duration::nanoseconds(1);

        assert!(EndBound::Before(midnight).admits(last_instant));
        assert!(!EndBound::Before(midnight).admits(midnight));
        assert!(EndBound::Inclusive(midnight).admits(midnight));
        assert!(!EndBound::Inclusive(last_instant).admits(midnight));
    }

    #[test]
    fn test_group_dimension_parse() {
        assert_eq!("page".parse::<GroupDimension>().ok(), Some(GroupDimension::Page));
        assert_eq!(GroupDimension::Device.limit(), None);
        assert_eq!(GroupDimension::Page.limit(), Some(TOP_PAGES_LIMIT));
    }
}
