//! 访问统计相关的数据库查询
//!
//! 供 AnalyticsService 调用，只读。

use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, sea_query::Expr,
};

use super::SeaOrmStorage;
use super::converters::model_to_visit_record;
use crate::analytics::VisitRecord;

use migration::entities::visitor_tracking;

// ============ 查询结果类型 ============

#[derive(Debug, FromQueryResult)]
pub struct CountRow {
    pub count: i64,
}

/// 分组统计结果行
#[derive(Debug, FromQueryResult)]
pub struct GroupRow {
    pub value: String,
    pub count: i64,
}

/// 分组维度对应的列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupColumn {
    DeviceType,
    Browser,
    PageVisited,
}

impl GroupColumn {
    fn column(self) -> visitor_tracking::Column {
        match self {
            GroupColumn::DeviceType => visitor_tracking::Column::DeviceType,
            GroupColumn::Browser => visitor_tracking::Column::Browser,
            GroupColumn::PageVisited => visitor_tracking::Column::PageVisited,
        }
    }
}

/// 访问日志过滤条件
#[derive(Debug, Clone, Default)]
pub struct VisitQuery {
    /// 设备类型（存储值，如 "mobile"）
    pub device: Option<String>,
    /// 浏览器家族（存储值，如 "Chrome"）
    pub browser: Option<String>,
    /// 模糊匹配 ip / page / user_agent
    pub search: Option<String>,
    /// visited_at >= start
    pub start: Option<DateTime<Utc>>,
    /// visited_at <= end
    pub end: Option<DateTime<Utc>>,
    /// visited_at < before
    pub before: Option<DateTime<Utc>>,
}

impl VisitQuery {
    fn condition(&self) -> Condition {
        let mut condition = Condition::all();

        if let Some(ref device) = self.device {
            condition = condition.add(visitor_tracking::Column::DeviceType.eq(device.as_str()));
        }
        if let Some(ref browser) = self.browser {
            condition = condition.add(visitor_tracking::Column::Browser.eq(browser.as_str()));
        }
        if let Some(ref search) = self.search {
            condition = condition.add(
                Condition::any()
                    .add(visitor_tracking::Column::IpAddress.contains(search.as_str()))
                    .add(visitor_tracking::Column::PageVisited.contains(search.as_str()))
                    .add(visitor_tracking::Column::UserAgent.contains(search.as_str())),
            );
        }
        if let Some(start) = self.start {
            condition = condition.add(visitor_tracking::Column::VisitedAt.gte(start));
        }
        if let Some(end) = self.end {
            condition = condition.add(visitor_tracking::Column::VisitedAt.lte(end));
        }
        if let Some(before) = self.before {
            condition = condition.add(visitor_tracking::Column::VisitedAt.lt(before));
        }

        condition
    }
}

// ============ SeaOrmStorage Analytics 方法 ============

impl SeaOrmStorage {
    /// 统计 `[start, end)` 内的不同 IP 数
    pub async fn count_distinct_ips_half_open(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<u64> {
        self.count_distinct_ips(
            Condition::all()
                .add(visitor_tracking::Column::VisitedAt.gte(start))
                .add(visitor_tracking::Column::VisitedAt.lt(end)),
        )
        .await
    }

    /// 统计 `[start, end]` 内的不同 IP 数
    pub async fn count_distinct_ips_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<u64> {
        self.count_distinct_ips(
            Condition::all()
                .add(visitor_tracking::Column::VisitedAt.gte(start))
                .add(visitor_tracking::Column::VisitedAt.lte(end)),
        )
        .await
    }

    /// 全部记录中的不同 IP 数
    pub async fn count_distinct_ips_total(&self) -> anyhow::Result<u64> {
        self.count_distinct_ips(Condition::all()).await
    }

    async fn count_distinct_ips(&self, condition: Condition) -> anyhow::Result<u64> {
        let row = visitor_tracking::Entity::find()
            .select_only()
            .column_as(Expr::cust("COUNT(DISTINCT ip_address)"), "count")
            .filter(condition)
            .into_model::<CountRow>()
            .one(&self.db)
            .await?;

        Ok(row.map(|r| r.count.max(0) as u64).unwrap_or(0))
    }

    /// 按列分组计数，按数量降序
    pub async fn group_counts(
        &self,
        column: GroupColumn,
        limit: Option<u64>,
    ) -> anyhow::Result<Vec<GroupRow>> {
        let col = column.column();
        let mut query = visitor_tracking::Entity::find()
            .select_only()
            .column_as(col, "value")
            .column_as(visitor_tracking::Column::Id.count(), "count")
            .group_by(col)
            .order_by_desc(Expr::cust("count"))
            .order_by_asc(col);

        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        query
            .into_model::<GroupRow>()
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    /// 分页加载访问日志，最新的在前
    ///
    /// 返回 (当前页记录, 总数)
    pub async fn load_visits_paginated(
        &self,
        filter: &VisitQuery,
        page: u64,
        page_size: u64,
    ) -> anyhow::Result<(Vec<VisitRecord>, u64)> {
        let paginator = visitor_tracking::Entity::find()
            .filter(filter.condition())
            .order_by_desc(visitor_tracking::Column::VisitedAt)
            .order_by_desc(visitor_tracking::Column::Id)
            .paginate(&self.db, page_size.max(1));

        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((models.into_iter().map(model_to_visit_record).collect(), total))
    }

    /// 访问记录总数（健康检查使用）
    pub async fn count_visits(&self) -> anyhow::Result<u64> {
        visitor_tracking::Entity::find()
            .count(&self.db)
            .await
            .map_err(Into::into)
    }
}
