pub mod config;
pub mod database;
pub mod models;

pub use config::*;
pub use database::*;
pub use models::*;
