//! REST API modules.

pub mod customers;
pub mod dto;
pub mod error;
pub mod health;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;
