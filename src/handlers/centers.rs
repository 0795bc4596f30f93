use axum::{
    extract::{Query, State},
    Json,
};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::center;
use crate::error::{AppError, AppResult};
use crate::utils::geo::{rank_nearest, GeoPoint, Located, RankedCandidate};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListCentersQuery {
    pub city: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NearestQuery {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub limit: Option<String>,
}

impl NearestQuery {
    /// Parse the query origin, rejecting anything that is not a real coordinate
    pub fn origin(&self) -> AppResult<GeoPoint> {
        let (Some(lat), Some(lng)) = (non_blank(&self.latitude), non_blank(&self.longitude)) else {
            return Err(AppError::BadRequest(
                "Latitude and longitude required".to_string(),
            ));
        };

        let point = GeoPoint::new(parse_degrees(lat, "latitude")?, parse_degrees(lng, "longitude")?);
        if !point.is_valid() {
            return Err(AppError::BadRequest("Coordinates out of range".to_string()));
        }

        Ok(point)
    }

    /// Requested result count; negative values mean "nothing"
    pub fn limit(&self, default: usize) -> AppResult<usize> {
        match non_blank(&self.limit) {
            None => Ok(default),
            Some(raw) => raw
                .parse::<i64>()
                .map(|n| usize::try_from(n).unwrap_or(0))
                .map_err(|_| AppError::BadRequest(format!("Invalid limit: {}", raw))),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_degrees(raw: &str, field: &str) -> AppResult<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AppError::BadRequest(format!("Invalid {}: {}", field, raw)))
}

/// Centers with a real location, ordered by name so ties rank predictably
async fn located_centers(state: &AppState) -> AppResult<Vec<center::Model>> {
    let centers = center::Entity::find()
        .order_by_asc(center::Column::Name)
        .all(&state.db)
        .await?;

    Ok(with_location(centers))
}

/// Drop centers still at the (0, 0) placeholder; they would rank as if real
fn with_location(centers: Vec<center::Model>) -> Vec<center::Model> {
    centers
        .into_iter()
        .filter(|c| !c.location().is_unset())
        .collect()
}

fn matches_city(center: &center::Model, city: &str) -> bool {
    let needle = city.to_lowercase();
    center
        .address
        .as_deref()
        .is_some_and(|address| address.to_lowercase().contains(&needle))
}

/// List centers, optionally narrowed to those whose address mentions `city`
pub async fn list_centers(
    State(state): State<AppState>,
    Query(query): Query<ListCentersQuery>,
) -> AppResult<Json<Vec<center::Model>>> {
    let centers = located_centers(&state).await?;

    let centers = match non_blank(&query.city) {
        Some(city) => centers.into_iter().filter(|c| matches_city(c, city)).collect(),
        None => centers,
    };

    Ok(Json(centers))
}

/// Nearest centers to the given point, closest first, each with its distance in km
pub async fn nearest_centers(
    State(state): State<AppState>,
    Query(query): Query<NearestQuery>,
) -> AppResult<Json<Vec<RankedCandidate<center::Model>>>> {
    let origin = query.origin()?;
    let limit = query.limit(state.config.nearest_default_limit)?;

    let centers = located_centers(&state).await?;
    let ranked = rank_nearest(origin, centers, limit);

    tracing::debug!(
        latitude = origin.latitude,
        longitude = origin.longitude,
        limit,
        returned = ranked.len(),
        "Ranked nearest centers"
    );

    Ok(Json(ranked))
}

#[derive(Debug, Deserialize)]
pub struct CreateCenterRequest {
    #[serde(default)]
    pub name: String,
    pub address: Option<String>,
    pub contact: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Create a center (admin). Omitted coordinates leave the location unset.
pub async fn create_center(
    State(state): State<AppState>,
    Json(payload): Json<CreateCenterRequest>,
) -> AppResult<Json<center::Model>> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Center name is required".to_string()));
    }

    let location = GeoPoint::new(payload.latitude.unwrap_or(0.0), payload.longitude.unwrap_or(0.0));
    if !location.is_valid() {
        return Err(AppError::BadRequest("Coordinates out of range".to_string()));
    }

    let center = center::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        address: Set(payload.address),
        contact: Set(payload.contact),
        latitude: Set(location.latitude),
        longitude: Set(location.longitude),
    };

    let created = center.insert(&state.db).await?;
    if location.is_unset() {
        tracing::warn!(center_id = %created.id, "Center created without a location");
    }

    Ok(Json(created))
}
