//! Create the `articles` table.
//!
//! Uses `IF NOT EXISTS` so databases written by earlier deployments of the
//! service, which created the same table without migration history, are
//! adopted as-is.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Articles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Articles::Url).text().not_null().primary_key())
                    .col(ColumnDef::new(Articles::Title).text().not_null())
                    .col(ColumnDef::new(Articles::Category).text().not_null())
                    .col(ColumnDef::new(Articles::PublishedDate).text().not_null())
                    .col(ColumnDef::new(Articles::CrawledDate).text().not_null())
                    .col(ColumnDef::new(Articles::Summary).text().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_articles_category")
                    .table(Articles::Table)
                    .col(Articles::Category)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_articles_crawled_date")
                    .table(Articles::Table)
                    .col(Articles::CrawledDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Articles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
#[sea_orm(iden = "articles")]
enum Articles {
    Table,
    Url,
    Title,
    Category,
    PublishedDate,
    CrawledDate,
    Summary,
}
