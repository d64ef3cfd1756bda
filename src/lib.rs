//! Library circulation server
//!
//! Keeps the catalog, borrow requests and loans of a library in memory and
//! exposes them through a REST JSON API. Stock, loan status and fines are
//! maintained by a single [`services::circulation::CirculationDesk`].

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<services::Services>,
}
