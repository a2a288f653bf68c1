use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::error::ApiError;

pub const INVALID_REQUEST_STRUCTURE: &str = "invalid request structure";

/// 从校验结果中取出一条对外的提示
///
/// 按字段名排序取第一个出错的字段；同一字段有多条错误时，
/// 缺失（`required`/`length`）优先于格式错误。
pub fn first_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .find_map(|(field, errs)| {
            errs.iter()
                .min_by_key(|e| if e.code == "required" || e.code == "length" { 0 } else { 1 })
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("{field} is invalid"),
                })
        })
        .unwrap_or_else(|| "validation error".to_string())
}

/// 解析并校验 JSON 请求体
///
/// 无法解析为目标结构时返回 400 "invalid request structure"，
/// 字段校验失败时返回 400 和具体的校验信息。
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            tracing::debug!(error = %e, "failed to read request body");
            ApiError::bad_request(INVALID_REQUEST_STRUCTURE)
        })?;

        let value: T = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::debug!(error = %e, "failed to parse request body");
            ApiError::bad_request(INVALID_REQUEST_STRUCTURE)
        })?;

        value.validate().map_err(|e| {
            tracing::debug!(errors = %e, "request validation failed");
            ApiError::bad_request(first_message(&e))
        })?;

        Ok(ValidJson(value))
    }
}
