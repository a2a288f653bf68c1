mod auth;
mod error_handler;
mod request_id;

pub use auth::{AuthGuard, authorize};
pub use error_handler::log_errors;
pub use request_id::{X_REQUEST_ID, assign_request_id};
