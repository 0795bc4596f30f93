use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "pickup_status")]
#[serde(rename_all = "lowercase")]
pub enum PickupStatus {
    #[default]
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "assigned")]
    Assigned,
    #[sea_orm(string_value = "picked")]
    Picked,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl PickupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PickupStatus::Pending => "pending",
            PickupStatus::Approved => "approved",
            PickupStatus::Assigned => "assigned",
            PickupStatus::Picked => "picked",
            PickupStatus::Completed => "completed",
            PickupStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for PickupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown pickup status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for PickupStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PickupStatus::Pending),
            "approved" => Ok(PickupStatus::Approved),
            "assigned" => Ok(PickupStatus::Assigned),
            "picked" => Ok(PickupStatus::Picked),
            "completed" => Ok(PickupStatus::Completed),
            "rejected" => Ok(PickupStatus::Rejected),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Item descriptions, stored as a JSON array
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct PickupItems(pub Vec<String>);

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pickup")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    #[sea_orm(column_type = "JsonBinary")]
    pub items: PickupItems,
    pub weight_grams: i32,
    pub address: Option<String>,
    pub center_id: Option<Uuid>,
    pub status: PickupStatus,
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AssignedTo",
        to = "super::user::Column::Id"
    )]
    Collector,
    #[sea_orm(
        belongs_to = "super::center::Entity",
        from = "Column::CenterId",
        to = "super::center::Column::Id"
    )]
    Center,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::center::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Center.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Points a user earns for a completed pickup: one per 100 g, halves round up
pub fn reward_points(weight_grams: i32) -> i32 {
    if weight_grams <= 0 {
        return 0;
    }
    weight_grams.saturating_add(50) / 100
}
