use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use uuid::Uuid;

use crate::entities::center;
use crate::entities::pickup::{self, PickupItems, PickupStatus};
use crate::entities::user::{self, UserRole};
use crate::error::AppResult;
use crate::handlers::auth::hash_password;

pub const ADMIN_EMAIL: &str = "admin@admin.com";
const ADMIN_PASSWORD: &str = "admin123";

/// (name, address, contact, latitude, longitude)
const SAMPLE_CENTERS: [(&str, &str, &str, f64, f64); 8] = [
    ("Downtown Recycling Center", "123 Main St, Downtown", "555-0001", 40.7128, -74.0060),
    ("North Side E-Waste Hub", "456 Oak Ave, North District", "555-0002", 40.7300, -74.0150),
    ("East Valley Collection Point", "789 Pine Rd, East Valley", "555-0003", 40.7500, -73.9700),
    ("West End E-Waste Disposal", "321 Maple Ln, West End", "555-0004", 40.7200, -74.0250),
    ("Central Tech Recycling", "654 Elm St, Central", "555-0005", 40.7150, -74.0080),
    ("South Bay E-Waste Center", "987 Birch Blvd, South Bay", "555-0006", 40.6950, -74.0130),
    ("Airport District Recycling", "246 Cedar Ave, Airport District", "555-0007", 40.7700, -73.9450),
    ("Industrial Zone Collection", "135 Spruce Ct, Industrial Zone", "555-0008", 40.7050, -74.0400),
];

/// Seed the admin account if it doesn't exist
pub async fn seed_admin(db: &DatabaseConnection) -> AppResult<user::Model> {
    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(ADMIN_EMAIL))
        .one(db)
        .await?;

    if let Some(admin) = existing {
        return Ok(admin);
    }

    let admin = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set("Admin User".to_string()),
        email: Set(ADMIN_EMAIL.to_string()),
        password_hash: Set(hash_password(ADMIN_PASSWORD)?),
        role: Set(UserRole::Admin),
        points: Set(0),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!("Admin account created: {}", ADMIN_EMAIL);
    Ok(admin)
}

/// Fill an empty database with demo centers and a few pickups owned by `owner`
pub async fn seed_sample_data(db: &DatabaseConnection, owner: &user::Model) -> AppResult<()> {
    if center::Entity::find().count(db).await? > 0 {
        tracing::info!("Centers already exist, skipping sample data");
        return Ok(());
    }

    let mut centers = Vec::with_capacity(SAMPLE_CENTERS.len());
    for (name, address, contact, latitude, longitude) in SAMPLE_CENTERS {
        let center = center::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            address: Set(Some(address.to_string())),
            contact: Set(Some(contact.to_string())),
            latitude: Set(latitude),
            longitude: Set(longitude),
        }
        .insert(db)
        .await?;
        centers.push(center);
    }

    let pickups = [
        (&["Old Monitor", "Keyboard", "Mouse"][..], 2500, PickupStatus::Pending, "123 Main St"),
        (&["Laptop", "Charger"][..], 1800, PickupStatus::Completed, "456 Oak Ave"),
        (&["Printer", "Ink Cartridges", "Paper Tray"][..], 3200, PickupStatus::Approved, "789 Pine Rd"),
    ];

    let seeded = pickups.len();
    for ((items, weight_grams, status, address), center) in pickups.into_iter().zip(&centers) {
        pickup::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(owner.id),
            items: Set(PickupItems(items.iter().map(|s| s.to_string()).collect())),
            weight_grams: Set(weight_grams),
            address: Set(Some(address.to_string())),
            center_id: Set(Some(center.id)),
            status: Set(status),
            assigned_to: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    tracing::info!(
        centers = centers.len(),
        pickups = seeded,
        "Sample data seeded"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::geo::GeoPoint;

    #[test]
    fn test_sample_centers_have_real_locations() {
        for (name, _, _, latitude, longitude) in SAMPLE_CENTERS {
            let point = GeoPoint::new(latitude, longitude);
            assert!(point.is_valid(), "{name} is out of range");
            assert!(!point.is_unset(), "{name} has no location");
        }
    }
}
