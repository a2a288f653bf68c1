pub mod validation;

use axum::Json;
use serde::Serialize;

use crate::result::ApiResult;

pub use validation::ValidJson;

pub fn success_to_api_response<T: Serialize>(data: T, message: &str) -> Json<ApiResult<T>> {
    Json(ApiResult::success(data, message))
}

pub fn error_to_api_response(message: impl Into<String>) -> Json<ApiResult<()>> {
    Json(ApiResult::error(message))
}
