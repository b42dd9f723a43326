mod bookmark;
mod health;

pub use bookmark::{DataResponse, DELETE_SUCCESS, UPDATE_SUCCESS};
pub use health::HealthResponse;
