use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
    TransactionTrait, UpdateMany,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::pickup::{self, reward_points, PickupItems, PickupStatus};
use crate::entities::{center, user};
use crate::error::{AppError, AppResult};
use crate::utils::jwt::Claims;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatePickupRequest {
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub weight_grams: i32,
    pub address: Option<String>,
    pub center_id: Option<Uuid>,
}

/// Submit a pickup request for the logged-in user
pub async fn create_pickup(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreatePickupRequest>,
) -> AppResult<(StatusCode, Json<pickup::Model>)> {
    if payload.weight_grams < 0 {
        return Err(AppError::BadRequest("Weight cannot be negative".to_string()));
    }

    if let Some(center_id) = payload.center_id {
        center::Entity::find_by_id(center_id)
            .one(&state.db)
            .await?
            .ok_or_else(|| AppError::BadRequest("Invalid center".to_string()))?;
    }

    let items = payload
        .items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect();

    let new_pickup = pickup::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(claims.sub),
        items: Set(PickupItems(items)),
        weight_grams: Set(payload.weight_grams),
        address: Set(payload.address),
        center_id: Set(payload.center_id),
        status: Set(PickupStatus::Pending),
        assigned_to: Set(None),
        ..Default::default()
    };

    let created = new_pickup.insert(&state.db).await?;
    tracing::info!(pickup_id = %created.id, user_id = %claims.sub, "Pickup requested");

    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct CenterSummary {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PickupResponse {
    pub id: Uuid,
    pub user: Option<UserSummary>,
    pub items: Vec<String>,
    pub weight_grams: i32,
    pub address: Option<String>,
    pub center: Option<CenterSummary>,
    pub status: PickupStatus,
    pub assigned_to: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
}

fn user_summary(users: &[user::Model], id: Option<Uuid>) -> Option<UserSummary> {
    let id = id?;
    users.iter().find(|u| u.id == id).map(|u| UserSummary {
        id: u.id,
        name: u.name.clone(),
        email: u.email.clone(),
    })
}

fn center_summary(centers: &[center::Model], id: Option<Uuid>) -> Option<CenterSummary> {
    let id = id?;
    centers.iter().find(|c| c.id == id).map(|c| CenterSummary {
        id: c.id,
        name: c.name.clone(),
        address: c.address.clone(),
    })
}

/// List every pickup with its requester, collector and center resolved (admin)
pub async fn list_pickups(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PickupResponse>>> {
    let pickups = pickup::Entity::find()
        .order_by_desc(pickup::Column::CreatedAt)
        .all(&state.db)
        .await?;
    let users = user::Entity::find().all(&state.db).await?;
    let centers = center::Entity::find().all(&state.db).await?;

    let responses: Vec<PickupResponse> = pickups
        .into_iter()
        .map(|p| PickupResponse {
            id: p.id,
            user: user_summary(&users, Some(p.user_id)),
            items: p.items.0,
            weight_grams: p.weight_grams,
            address: p.address,
            center: center_summary(&centers, p.center_id),
            status: p.status,
            assigned_to: user_summary(&users, p.assigned_to),
            created_at: p.created_at.with_timezone(&Utc),
        })
        .collect();

    Ok(Json(responses))
}

#[derive(Debug, Deserialize)]
pub struct UpdatePickupRequest {
    pub status: Option<String>,
    pub assigned_to: Option<Uuid>,
}

impl UpdatePickupRequest {
    pub fn parsed_status(&self) -> AppResult<Option<PickupStatus>> {
        self.status
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<PickupStatus>()
                    .map_err(|_| AppError::BadRequest("Invalid status value".to_string()))
            })
            .transpose()
    }
}

/// Whether moving from `old` to `new` should credit the requester
pub fn earns_reward(old: PickupStatus, new: PickupStatus) -> bool {
    old != PickupStatus::Completed && new == PickupStatus::Completed
}

/// Load a pickup holding its row lock until the transaction ends, so
/// concurrent reviews of the same pickup see each other's status change
fn pickup_for_update(pickup_id: Uuid) -> Select<pickup::Entity> {
    pickup::Entity::find_by_id(pickup_id).lock_exclusive()
}

/// Add `earned` to the user's balance in the database, not from a stale read
fn credit_points(user_id: Uuid, earned: i32) -> UpdateMany<user::Entity> {
    user::Entity::update_many()
        .col_expr(user::Column::Points, Expr::col(user::Column::Points).add(earned))
        .filter(user::Column::Id.eq(user_id))
}

/// Update a pickup's status and/or collector (admin)
pub async fn update_pickup(
    State(state): State<AppState>,
    Path(pickup_id): Path<Uuid>,
    Json(payload): Json<UpdatePickupRequest>,
) -> AppResult<Json<pickup::Model>> {
    let new_status = payload.parsed_status()?;

    let txn = state.db.begin().await?;

    let existing = pickup_for_update(pickup_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Pickup not found".to_string()))?;

    if let Some(collector_id) = payload.assigned_to {
        user::Entity::find_by_id(collector_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::BadRequest("Assigned user not found".to_string()))?;
    }

    let old_status = existing.status;
    let owner_id = existing.user_id;
    let weight_grams = existing.weight_grams;

    let mut active: pickup::ActiveModel = existing.into();
    if let Some(status) = new_status {
        active.status = Set(status);
    }
    if let Some(collector_id) = payload.assigned_to {
        active.assigned_to = Set(Some(collector_id));
    }
    let updated = active.update(&txn).await?;

    if earns_reward(old_status, updated.status) {
        let earned = reward_points(weight_grams);
        let result = credit_points(owner_id, earned).exec(&txn).await?;
        if result.rows_affected > 0 {
            tracing::info!(user_id = %owner_id, earned, "Credited pickup reward");
        }
    }

    txn.commit().await?;

    tracing::info!(
        pickup_id = %updated.id,
        from = %old_status,
        to = %updated.status,
        "Pickup updated"
    );

    Ok(Json(updated))
}
