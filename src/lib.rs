pub mod config;
pub mod db;
pub mod error;
pub mod handler;
pub mod model;
pub mod route;
pub mod schema;
pub mod session;
pub mod store;

use sqlx::SqlitePool;

// Struct representing the application state
pub struct AppState {
    pub db: SqlitePool,
}
