//! 访客追踪表迁移
//!
//! 创建 visitor_tracking 表，每次页面访问一行：
//! - 客户端 IP、会话标识、访问路径（访问指纹）
//! - 设备类型、浏览器家族
//! - 来源 (referrer)、原始 User-Agent
//! - 地理位置信息 (country, city)

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VisitorTracking::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VisitorTracking::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(VisitorTracking::IpAddress)
                            .string_len(45)
                            .not_null(),
                    )
                    .col(ColumnDef::new(VisitorTracking::UserAgent).text().null())
                    .col(
                        ColumnDef::new(VisitorTracking::PageVisited)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(VisitorTracking::Referrer).text().null())
                    .col(
                        ColumnDef::new(VisitorTracking::SessionKey)
                            .string_len(40)
                            .null(),
                    )
                    .col(ColumnDef::new(VisitorTracking::Country).string_len(100).null())
                    .col(ColumnDef::new(VisitorTracking::City).string_len(100).null())
                    .col(
                        ColumnDef::new(VisitorTracking::DeviceType)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VisitorTracking::Browser)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VisitorTracking::VisitedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 时间范围查询（今日/周/月、每日趋势）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_visitor_tracking_visited_at")
                    .table(VisitorTracking::Table)
                    .col(VisitorTracking::VisitedAt)
                    .to_owned(),
            )
            .await?;

        // 独立访客统计
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_visitor_tracking_ip")
                    .table(VisitorTracking::Table)
                    .col(VisitorTracking::IpAddress)
                    .to_owned(),
            )
            .await?;

        // 去重检查 (ip, session, path)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_visitor_tracking_visit_key")
                    .table(VisitorTracking::Table)
                    .col(VisitorTracking::IpAddress)
                    .col(VisitorTracking::SessionKey)
                    .col(VisitorTracking::PageVisited)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_visitor_tracking_visit_key")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(Index::drop().name("idx_visitor_tracking_ip").to_owned())
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_visitor_tracking_visited_at")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(VisitorTracking::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum VisitorTracking {
    #[sea_orm(iden = "visitor_tracking")]
    Table,
    Id,
    IpAddress,
    UserAgent,
    PageVisited,
    Referrer,
    SessionKey,
    Country,
    City,
    DeviceType,
    Browser,
    VisitedAt,
}
