use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Center::Table)
                    .if_not_exists()
                    .col(uuid(Center::Id).primary_key())
                    .col(string_len(Center::Name, 200).not_null())
                    .col(string_null(Center::Address))
                    .col(string_len_null(Center::Contact, 100))
                    // (0, 0) marks a center whose location is not known yet
                    .col(double(Center::Latitude).not_null().default(0.0))
                    .col(double(Center::Longitude).not_null().default(0.0))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Center::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Center {
    Table,
    Id,
    Name,
    Address,
    Contact,
    Latitude,
    Longitude,
}
