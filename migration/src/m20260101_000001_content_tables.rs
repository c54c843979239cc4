//! 内容表迁移
//!
//! 创建 themes / subsites / links 三张表。
//! subsites.parent_id 与 links.subsite_id 不建外键：
//! 删除父站点后子站点保留悬空的 parent_id，链接由应用层级联删除。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Themes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Themes::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Themes::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Themes::Colors).text().not_null())
                    .col(ColumnDef::new(Themes::LogoUrl).text().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Subsites::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subsites::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Subsites::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Subsites::Description).text().null())
                    .col(ColumnDef::new(Subsites::IconKind).string_len(16).null())
                    .col(ColumnDef::new(Subsites::IconValue).text().null())
                    .col(ColumnDef::new(Subsites::Url).text().null())
                    .col(ColumnDef::new(Subsites::CustomDomain).string_len(255).null())
                    .col(ColumnDef::new(Subsites::ParentId).string_len(36).null())
                    .col(
                        ColumnDef::new(Subsites::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        // 子站点查询
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_subsites_parent_order")
                    .table(Subsites::Table)
                    .col(Subsites::ParentId)
                    .col(Subsites::SortOrder)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Links::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Links::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Links::SubsiteId).string_len(36).not_null())
                    .col(ColumnDef::new(Links::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Links::Url).text().not_null())
                    .col(ColumnDef::new(Links::Description).text().null())
                    .col(ColumnDef::new(Links::IconKind).string_len(16).null())
                    .col(ColumnDef::new(Links::IconValue).text().null())
                    .col(
                        ColumnDef::new(Links::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        // 站点下链接查询与级联删除
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_links_subsite_order")
                    .table(Links::Table)
                    .col(Links::SubsiteId)
                    .col(Links::SortOrder)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_links_subsite_order").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_subsites_parent_order").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Links::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Subsites::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Themes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Themes {
    #[sea_orm(iden = "themes")]
    Table,
    Id,
    Name,
    Colors,
    LogoUrl,
}

#[derive(DeriveIden)]
enum Subsites {
    #[sea_orm(iden = "subsites")]
    Table,
    Id,
    Name,
    Description,
    IconKind,
    IconValue,
    Url,
    CustomDomain,
    ParentId,
    SortOrder,
}

#[derive(DeriveIden)]
enum Links {
    #[sea_orm(iden = "links")]
    Table,
    Id,
    SubsiteId,
    Name,
    Url,
    Description,
    IconKind,
    IconValue,
    SortOrder,
}
