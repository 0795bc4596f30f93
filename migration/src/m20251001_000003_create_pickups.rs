use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20251001_000001_create_users::User;
use super::m20251001_000002_create_centers::Center;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(PickupStatus::Enum)
                    .values([
                        PickupStatus::Pending,
                        PickupStatus::Approved,
                        PickupStatus::Assigned,
                        PickupStatus::Picked,
                        PickupStatus::Completed,
                        PickupStatus::Rejected,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Pickup::Table)
                    .if_not_exists()
                    .col(uuid(Pickup::Id).primary_key())
                    .col(uuid(Pickup::UserId).not_null())
                    .col(json_binary(Pickup::Items).not_null())
                    .col(integer(Pickup::WeightGrams).not_null().default(0))
                    .col(string_null(Pickup::Address))
                    .col(uuid_null(Pickup::CenterId))
                    .col(
                        ColumnDef::new(Pickup::Status)
                            .custom(PickupStatus::Enum)
                            .not_null()
                            .default("pending"),
                    )
                    .col(uuid_null(Pickup::AssignedTo))
                    .col(
                        timestamp_with_time_zone(Pickup::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pickup_user")
                            .from(Pickup::Table, Pickup::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pickup_assigned_to")
                            .from(Pickup::Table, Pickup::AssignedTo)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pickup_center")
                            .from(Pickup::Table, Pickup::CenterId)
                            .to(Center::Table, Center::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Pickup::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(PickupStatus::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Pickup {
    Table,
    Id,
    UserId,
    Items,
    WeightGrams,
    Address,
    CenterId,
    Status,
    AssignedTo,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum PickupStatus {
    #[sea_orm(iden = "pickup_status")]
    Enum,
    #[sea_orm(iden = "pending")]
    Pending,
    #[sea_orm(iden = "approved")]
    Approved,
    #[sea_orm(iden = "assigned")]
    Assigned,
    #[sea_orm(iden = "picked")]
    Picked,
    #[sea_orm(iden = "completed")]
    Completed,
    #[sea_orm(iden = "rejected")]
    Rejected,
}
