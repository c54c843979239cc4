//! 统计事件表迁移
//!
//! analytics_events 为只追加日志，resource_id 不做外键约束。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AnalyticsEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AnalyticsEvents::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::EventType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::ResourceType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::ResourceId)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 用于 top-N 分组统计
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_analytics_events_kind_resource")
                    .table(AnalyticsEvents::Table)
                    .col(AnalyticsEvents::EventType)
                    .col(AnalyticsEvents::ResourceType)
                    .col(AnalyticsEvents::ResourceId)
                    .to_owned(),
            )
            .await?;

        // 用于最近活动查询
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_analytics_events_timestamp")
                    .table(AnalyticsEvents::Table)
                    .col(AnalyticsEvents::Timestamp)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_analytics_events_timestamp")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_analytics_events_kind_resource")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(AnalyticsEvents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AnalyticsEvents {
    #[sea_orm(iden = "analytics_events")]
    Table,
    Id,
    EventType,
    ResourceType,
    ResourceId,
    Timestamp,
}
