pub mod center;
pub mod pickup;
pub mod user;
