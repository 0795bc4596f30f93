pub mod auth;
pub mod centers;
pub mod pickups;
