//! 访问指纹列迁移
//!
//! 为严格去重模式添加 fingerprint 列和唯一索引。
//! best_effort 模式下该列保持 NULL，NULL 之间不冲突，不影响原有写入。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(VisitorTracking::Table)
                    .add_column(
                        ColumnDef::new(VisitorTracking::Fingerprint)
                            .string_len(16)
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .unique()
                    .name("uq_visitor_tracking_fingerprint")
                    .table(VisitorTracking::Table)
                    .col(VisitorTracking::Fingerprint)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("uq_visitor_tracking_fingerprint")
                    .table(VisitorTracking::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(VisitorTracking::Table)
                    .drop_column(VisitorTracking::Fingerprint)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum VisitorTracking {
    #[sea_orm(iden = "visitor_tracking")]
    Table,
    Fingerprint,
}
