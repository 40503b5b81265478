pub mod dto;
mod handlers;
pub mod repo;
pub mod streak;

use crate::state::AppState;
use axum::Router;

pub use streak::{apply_meal_log, TrackingState};

pub fn router() -> Router<AppState> {
    handlers::tracking_routes()
}
