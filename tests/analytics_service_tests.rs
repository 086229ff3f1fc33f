//! AnalyticsService 集成测试
//!
//! 覆盖访客窗口、分组计数、每日趋势、dashboard 降级与访问日志分页。

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use sea_orm::ConnectionTrait;
use tempfile::TempDir;

use ovencraft::analytics::{BrowserFamily, DeviceClass, NewVisit, VisitSink};
use ovencraft::config::DatabaseConfig;
use ovencraft::errors::OvencraftError;
use ovencraft::services::{
    AnalyticsService, DashboardSnapshot, EndBound, GroupDimension, VisitFilter, VisitorWindow,
};
use ovencraft::storage::SeaOrmStorage;

const IPHONE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) \
                         AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
const IPAD_UA: &str = "Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X) AppleWebKit/605.1.15 \
                       (KHTML, like Gecko) Version/17.0 Safari/604.1";
const WINDOWS_CHROME_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                                 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";
const LINUX_FIREFOX_UA: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:123.0) Gecko/20100101 Firefox/123.0";

// =============================================================================
// 辅助函数
// =============================================================================

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
}

async fn create_temp_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    let td = TempDir::new().unwrap();
    let p = td.path().join("analytics_svc_test.db");
    let config = DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", p.display()),
        ..DatabaseConfig::default()
    };
    let s = SeaOrmStorage::connect(&config).await.unwrap();
    (Arc::new(s), td)
}

async fn seed(storage: &SeaOrmStorage, ip: &str, ua: &str, page: &str, at: DateTime<Utc>) {
    storage
        .insert_visit(NewVisit::new(ip, Some(ua.to_string()), page).at(at))
        .await
        .unwrap();
}

// =============================================================================
// 访客统计
// =============================================================================

#[tokio::test]
async fn test_today_counts_distinct_clients() {
    let (storage, _td) = create_temp_storage().await;
    let now = fixed_now();

    for (page, offset) in [("/", 1), ("/about", 2), ("/faq", 3)] {
        seed(&storage, "9.9.9.9", IPHONE_UA, page, now - Duration::hours(offset)).await;
    }

    let service = AnalyticsService::new(storage);
    let today = service
        .distinct_visitors_in_window(now, VisitorWindow::Today)
        .await
        .unwrap();
    assert_eq!(today, 1);
}

#[tokio::test]
async fn test_single_client_two_pages() {
    let (storage, _td) = create_temp_storage().await;
    let now = fixed_now();

    seed(&storage, "1.1.1.1", WINDOWS_CHROME_UA, "/home", now - Duration::hours(3)).await;
    seed(&storage, "1.1.1.1", WINDOWS_CHROME_UA, "/about", now - Duration::hours(2)).await;

    let stats = AnalyticsService::new(storage).visitor_stats(now).await.unwrap();
    assert_eq!(stats.today, 1);
    assert_eq!(stats.week, 1);
    assert_eq!(stats.month, 1);
    assert_eq!(stats.total, 1);
}

#[tokio::test]
async fn test_window_boundaries() {
    let (storage, _td) = create_temp_storage().await;
    let now = fixed_now();
    let midnight = Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap();

    seed(&storage, "10.0.0.1", WINDOWS_CHROME_UA, "/", midnight).await;
    seed(&storage, "10.0.0.2", WINDOWS_CHROME_UA, "/", midnight - Duration::seconds(1)).await;
    seed(&storage, "10.0.0.3", WINDOWS_CHROME_UA, "/", now - Duration::days(3)).await;
    // 恰好落在 7 天窗口边界
    seed(&storage, "10.0.0.4", WINDOWS_CHROME_UA, "/", now - Duration::days(7)).await;
    seed(&storage, "10.0.0.5", WINDOWS_CHROME_UA, "/", now - Duration::days(10)).await;
    seed(&storage, "10.0.0.6", WINDOWS_CHROME_UA, "/", now - Duration::days(40)).await;

    let stats = AnalyticsService::new(storage).visitor_stats(now).await.unwrap();
    assert_eq!(stats.today, 1);
    assert_eq!(stats.week, 4);
    assert_eq!(stats.month, 5);
    assert_eq!(stats.total, 6);
}

#[tokio::test]
async fn test_window_upper_bounds() {
    let (storage, _td) = create_temp_storage().await;
    let now = fixed_now();
    let next_midnight = Utc.with_ymd_and_hms(2026, 3, 16, 0, 0, 0).unwrap();

    seed(&storage, "10.0.1.1", WINDOWS_CHROME_UA, "/", now).await;
    // 今天但晚于 now：计入今天，不计入 7/30 天窗口
    seed(&storage, "10.0.1.2", WINDOWS_CHROME_UA, "/", now + Duration::hours(1)).await;
    // 恰好是下一个零点：不属于今天
    seed(&storage, "10.0.1.3", WINDOWS_CHROME_UA, "/", next_midnight).await;
    seed(&storage, "10.0.1.4", WINDOWS_CHROME_UA, "/", next_midnight - Duration::seconds(1)).await;
    seed(&storage, "10.0.1.5", WINDOWS_CHROME_UA, "/", now + Duration::days(3)).await;

    let stats = AnalyticsService::new(storage).visitor_stats(now).await.unwrap();
    assert_eq!(stats.today, 3);
    assert_eq!(stats.week, 1);
    assert_eq!(stats.month, 1);
    assert_eq!(stats.total, 5);
}

// =============================================================================
// 分组计数
// =============================================================================

#[tokio::test]
async fn test_device_and_browser_groups() {
    let (storage, _td) = create_temp_storage().await;
    let now = fixed_now();

    seed(&storage, "1.0.0.1", IPHONE_UA, "/", now).await;
    seed(&storage, "1.0.0.2", IPHONE_UA, "/", now).await;
    seed(&storage, "1.0.0.3", IPAD_UA, "/", now).await;
    seed(&storage, "1.0.0.4", WINDOWS_CHROME_UA, "/", now).await;
    seed(&storage, "1.0.0.5", LINUX_FIREFOX_UA, "/", now).await;

    let service = AnalyticsService::new(storage);

    let devices = service.grouped_counts(GroupDimension::Device).await.unwrap();
    assert_eq!(devices[0].value, "desktop");
    assert_eq!(devices[0].count, 2);
    assert_eq!(devices[1].value, "mobile");
    assert_eq!(devices[1].count, 2);
    assert_eq!(devices[2].value, "tablet");
    assert_eq!(devices[2].count, 1);

    let browsers = service.grouped_counts(GroupDimension::Browser).await.unwrap();
    assert_eq!(browsers[0].value, "Safari");
    assert_eq!(browsers[0].count, 3);
    let names: Vec<&str> = browsers.iter().map(|b| b.value.as_str()).collect();
    assert!(names.contains(&"Chrome"));
    assert!(names.contains(&"Firefox"));
}

#[tokio::test]
async fn test_top_pages_limited_and_sorted() {
    let (storage, _td) = create_temp_storage().await;
    let now = fixed_now();

    for i in 0..12u32 {
        for n in 0..=i {
            let ip = format!("172.16.{}.{}", i, n);
            seed(&storage, &ip, WINDOWS_CHROME_UA, &format!("/page-{}", i), now).await;
        }
    }

    let pages = AnalyticsService::new(storage)
        .grouped_counts(GroupDimension::Page)
        .await
        .unwrap();

    assert_eq!(pages.len(), 10);
    assert_eq!(pages[0].value, "/page-11");
    assert_eq!(pages[0].count, 12);
    assert!(pages.windows(2).all(|w| w[0].count >= w[1].count));
}

// =============================================================================
// 每日趋势
// =============================================================================

#[tokio::test]
async fn test_daily_trend_is_contiguous_and_ascending() {
    let (storage, _td) = create_temp_storage().await;
    let now = fixed_now();

    seed(&storage, "2.2.2.1", IPHONE_UA, "/", now - Duration::hours(1)).await;
    seed(&storage, "2.2.2.2", IPHONE_UA, "/", now - Duration::hours(2)).await;
    seed(&storage, "2.2.2.3", IPHONE_UA, "/", now - Duration::days(2)).await;
    seed(&storage, "2.2.2.3", IPHONE_UA, "/blog", now - Duration::days(2)).await;
    // 超出 7 天范围
    seed(&storage, "2.2.2.4", IPHONE_UA, "/", now - Duration::days(7)).await;

    let trend = AnalyticsService::new(storage)
        .daily_trend(now, 7)
        .await
        .unwrap();

    assert_eq!(trend.len(), 7);
    assert_eq!(trend[0].date, NaiveDate::from_ymd_opt(2026, 3, 9).unwrap());
    assert_eq!(trend[6].date, NaiveDate::from_ymd_opt(2026, 3, 15).unwrap());
    assert!(
        trend
            .windows(2)
            .all(|w| w[1].date == w[0].date + Duration::days(1))
    );

    let counts: Vec<u64> = trend.iter().map(|d| d.count).collect();
    assert_eq!(counts, vec![0, 0, 0, 0, 1, 0, 2]);
}

#[tokio::test]
async fn test_daily_trend_zero_days_is_empty() {
    let (storage, _td) = create_temp_storage().await;
    let trend = AnalyticsService::new(storage)
        .daily_trend(fixed_now(), 0)
        .await
        .unwrap();
    assert!(trend.is_empty());
}

// =============================================================================
// Dashboard
// =============================================================================

#[tokio::test]
async fn test_dashboard_bundles_all_statistics() {
    let (storage, _td) = create_temp_storage().await;
    let now = fixed_now();

    seed(&storage, "1.1.1.1", IPHONE_UA, "/home", now - Duration::hours(1)).await;
    seed(&storage, "1.1.1.1", IPHONE_UA, "/about", now - Duration::hours(1)).await;

    let snapshot = AnalyticsService::new(storage).dashboard(now).await.unwrap();
    assert_eq!(snapshot.generated_at, now);
    assert_eq!(snapshot.visitors.today, 1);
    assert_eq!(snapshot.devices.len(), 1);
    assert_eq!(snapshot.pages.len(), 2);
    assert_eq!(snapshot.trend.len(), 7);
    assert_eq!(snapshot.trend[6].count, 1);
}

#[tokio::test]
async fn test_dashboard_falls_back_when_store_fails() {
    let (storage, _td) = create_temp_storage().await;
    storage
        .get_db()
        .execute_unprepared("DROP TABLE visitor_tracking")
        .await
        .unwrap();

    let now = fixed_now();
    let service = AnalyticsService::new(storage);

    assert!(matches!(
        service.dashboard(now).await,
        Err(OvencraftError::AnalyticsQueryFailed(_))
    ));

    let snapshot = service.dashboard_or_default(now).await;
    assert_eq!(snapshot, DashboardSnapshot::empty(now));
    assert_eq!(snapshot.visitors.total, 0);
    assert_eq!(snapshot.trend.len(), 7);
    assert!(snapshot.trend.iter().all(|d| d.count == 0));
}

#[tokio::test]
async fn test_dashboard_cache_serves_previous_snapshot() {
    let (storage, _td) = create_temp_storage().await;
    let now = fixed_now();
    seed(&storage, "3.3.3.1", IPHONE_UA, "/", now).await;

    let service = AnalyticsService::new(storage.clone()).with_cache_ttl(300);
    let first = service.dashboard(now).await.unwrap();

    seed(&storage, "3.3.3.2", IPHONE_UA, "/", now).await;
    let second = service.dashboard(now).await.unwrap();
    assert_eq!(first, second);

    let uncached = AnalyticsService::new(storage).dashboard(now).await.unwrap();
    assert_eq!(uncached.visitors.total, 2);
}

// =============================================================================
// 访问日志
// =============================================================================

#[tokio::test]
async fn test_list_visits_filters_and_pagination() {
    let (storage, _td) = create_temp_storage().await;
    let now = fixed_now();

    for i in 0..5 {
        seed(&storage, &format!("4.4.4.{}", i), IPHONE_UA, "/gallery", now - Duration::minutes(i)).await;
    }
    seed(&storage, "5.5.5.5", WINDOWS_CHROME_UA, "/contact", now - Duration::days(2)).await;

    let service = AnalyticsService::new(storage);

    let all = service.list_visits(&VisitFilter::default(), 1, 4).await.unwrap();
    assert_eq!(all.total, 6);
    assert_eq!(all.items.len(), 4);
    assert_eq!(all.total_pages, 2);
    // 最新的在前
    assert_eq!(all.items[0].ip_address, "4.4.4.0");

    let second = service.list_visits(&VisitFilter::default(), 2, 4).await.unwrap();
    assert_eq!(second.items.len(), 2);
    assert_eq!(second.items[1].ip_address, "5.5.5.5");

    let mobile = VisitFilter {
        device: Some(DeviceClass::Mobile),
        ..Default::default()
    };
    assert_eq!(service.list_visits(&mobile, 1, 20).await.unwrap().total, 5);

    let chrome = VisitFilter {
        browser: Some(BrowserFamily::Chrome),
        ..Default::default()
    };
    let chrome_page = service.list_visits(&chrome, 1, 20).await.unwrap();
    assert_eq!(chrome_page.total, 1);
    assert_eq!(chrome_page.items[0].page_visited, "/contact");

    let search = VisitFilter {
        search: Some("contact".to_string()),
        ..Default::default()
    };
    assert_eq!(service.list_visits(&search, 1, 20).await.unwrap().total, 1);

    let recent = VisitFilter {
        start: Some(now - Duration::days(1)),
        end: Some(EndBound::Inclusive(now)),
        ..Default::default()
    };
    assert_eq!(service.list_visits(&recent, 1, 20).await.unwrap().total, 5);
}

#[tokio::test]
async fn test_list_visits_rejects_inverted_range() {
    let (storage, _td) = create_temp_storage().await;
    let now = fixed_now();

    let filter = VisitFilter {
        start: Some(now),
        end: Some(EndBound::Inclusive(now - Duration::days(1))),
        ..Default::default()
    };
    let service = AnalyticsService::new(storage);
    let result = service.list_visits(&filter, 1, 20).await;
    assert!(matches!(
        result,
        Err(OvencraftError::AnalyticsInvalidDateRange(_))
    ));

    // 排他上界与起点相同，区间为空
    let empty = VisitFilter {
        start: Some(now),
        end: Some(EndBound::Before(now)),
        ..Default::default()
    };
    assert!(matches!(
        service.list_visits(&empty, 1, 20).await,
        Err(OvencraftError::AnalyticsInvalidDateRange(_))
    ));
}

#[tokio::test]
async fn test_list_visits_date_only_range_covers_whole_day() {
    let (storage, _td) = create_temp_storage().await;
    let day_start = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
    let next_day = day_start + Duration::days(1);

    seed(&storage, "6.6.6.1", IPHONE_UA, "/", day_start - Duration::seconds(1)).await;
    seed(&storage, "6.6.6.2", IPHONE_UA, "/", day_start).await;
    // 当天最后一刻，带亚毫秒精度
    seed(&storage, "6.6.6.3", IPHONE_UA, "/", next_day - Duration::nanoseconds(500)).await;
    seed(&storage, "6.6.6.4", IPHONE_UA, "/", next_day).await;

    let filter = VisitFilter {
        start: Some(AnalyticsService::parse_date("2026-03-01").unwrap()),
        end: Some(AnalyticsService::parse_end_date("2026-03-01").unwrap()),
        ..Default::default()
    };
    let page = AnalyticsService::new(storage)
        .list_visits(&filter, 1, 20)
        .await
        .unwrap();

    let mut ips: Vec<_> = page.items.iter().map(|v| v.ip_address.as_str()).collect();
    ips.sort_unstable();
    assert_eq!(page.total, 2);
    assert_eq!(ips, vec!["6.6.6.2", "6.6.6.3"]);
}

#[test]
fn test_parse_date_formats() {
    let start = AnalyticsService::parse_date("2026-03-01").unwrap();
    assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());

    let end = AnalyticsService::parse_end_date("2026-03-01").unwrap();
    assert_eq!(
        end,
        EndBound::Before(Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap())
    );
    assert!(end.admits(start));

    let rfc = AnalyticsService::parse_date("2026-03-01T08:30:00+02:00").unwrap();
    assert_eq!(rfc, Utc.with_ymd_and_hms(2026, 3, 1, 6, 30, 0).unwrap());

    let err = AnalyticsService::parse_end_date("03/01/2026").unwrap_err();
    assert!(matches!(err, OvencraftError::DateParse(_)));
}
