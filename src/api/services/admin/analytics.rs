//! Analytics API 端点
//!
//! - dashboard 快照（查询失败时返回全零数据）
//! - 访客数 / 设备 / 浏览器 / 热门页面
//! - 每日趋势
//! - 访问日志分页

use std::str::FromStr;
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use chrono::Utc;
use tracing::{debug, warn};

use super::error_code::ErrorCode;
use super::helpers::{api_result, error_from_ovencraft, error_response, success_response};
use super::types::{TrendQuery, VisitsQuery};
use crate::analytics::{BrowserFamily, DeviceClass};
use crate::services::{AnalyticsService, DEFAULT_TREND_DAYS, GroupDimension, VisitFilter};

pub const MAX_TREND_DAYS: u32 = 90;
pub const DEFAULT_PAGE_SIZE: u64 = 20;

type Service = web::Data<Arc<AnalyticsService>>;

/// GET /dashboard
pub async fn get_dashboard(service: Service) -> HttpResponse {
    success_response(service.dashboard_or_default(Utc::now()).await)
}

/// GET /visitors
pub async fn get_visitors(service: Service) -> HttpResponse {
    api_result(service.visitor_stats(Utc::now()).await)
}

/// GET /devices
pub async fn get_devices(service: Service) -> HttpResponse {
    api_result(service.grouped_counts(GroupDimension::Device).await)
}

/// GET /browsers
pub async fn get_browsers(service: Service) -> HttpResponse {
    api_result(service.grouped_counts(GroupDimension::Browser).await)
}

/// GET /pages
pub async fn get_pages(service: Service) -> HttpResponse {
    api_result(service.grouped_counts(GroupDimension::Page).await)
}

/// GET /trend?days=N
pub async fn get_trend(service: Service, query: web::Query<TrendQuery>) -> HttpResponse {
    let days = query
        .days
        .unwrap_or(DEFAULT_TREND_DAYS)
        .clamp(1, MAX_TREND_DAYS);
    debug!("Analytics API: trend for {} days", days);
    api_result(service.daily_trend(Utc::now(), days).await)
}

fn parse_filter_value<T: FromStr>(name: &str, raw: Option<&str>) -> Result<Option<T>, String> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|_| format!("Invalid {} filter: '{}'", name, value)),
    }
}

fn build_filter(query: &VisitsQuery) -> Result<VisitFilter, HttpResponse> {
    let bad_request = |msg: String| error_response(StatusCode::BAD_REQUEST, ErrorCode::BadRequest, &msg);

    let device = parse_filter_value::<DeviceClass>("device", query.device.as_deref())
        .map_err(bad_request)?;
    let browser = parse_filter_value::<BrowserFamily>("browser", query.browser.as_deref())
        .map_err(bad_request)?;

    let non_empty = |raw: Option<&str>| raw.map(str::trim).filter(|s| !s.is_empty()).map(String::from);
    let start = non_empty(query.start_date.as_deref())
        .map(|s| AnalyticsService::parse_date(&s))
        .transpose()
        .map_err(|e| error_from_ovencraft(&e))?;
    let end = non_empty(query.end_date.as_deref())
        .map(|s| AnalyticsService::parse_end_date(&s))
        .transpose()
        .map_err(|e| error_from_ovencraft(&e))?;

    Ok(VisitFilter {
        device,
        browser,
        search: query.search.clone(),
        start,
        end,
    })
}

/// GET /visits
pub async fn get_visits(service: Service, query: web::Query<VisitsQuery>) -> HttpResponse {
    let filter = match build_filter(&query) {
        Ok(filter) => filter,
        Err(resp) => {
            warn!("Analytics API: rejected visit log query {:?}", query.0);
            return resp;
        }
    };

    let page = query.page.unwrap_or(1);
    let page_size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    api_result(service.list_visits(&filter, page, page_size).await)
}

/// 统计路由 `/analytics`
pub fn analytics_routes() -> actix_web::Scope {
    web::scope("/analytics")
        .route("/dashboard", web::get().to(get_dashboard))
        .route("/visitors", web::get().to(get_visitors))
        .route("/devices", web::get().to(get_devices))
        .route("/browsers", web::get().to(get_browsers))
        .route("/pages", web::get().to(get_pages))
        .route("/trend", web::get().to(get_trend))
        .route("/visits", web::get().to(get_visits))
}
