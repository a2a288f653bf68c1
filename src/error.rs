use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tonic::Code;

use crate::infrastructure::AuthError;
use crate::utils::error_to_api_response;

/// 网关对外的错误，转换为状态码加统一信封
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, error_to_api_response(self.to_string())).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

/// 认证服务调用失败的分类
///
/// gRPC 状态码保留下来，由各个处理器按操作映射为 HTTP 响应。
/// `Transport` 表示调用根本没有拿到 gRPC 状态（通道不可用、元数据无法编码等）。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("failed precondition: {0}")]
    FailedPrecondition(String),
    #[error("backend returned {code:?}: {message}")]
    Other { code: Code, message: String },
    #[error("transport failure: {0}")]
    Transport(String),
}

impl From<tonic::Status> for BackendError {
    fn from(status: tonic::Status) -> Self {
        let message = status.message().to_owned();
        match status.code() {
            Code::InvalidArgument => BackendError::InvalidArgument(message),
            Code::FailedPrecondition => BackendError::FailedPrecondition(message),
            code => BackendError::Other { code, message },
        }
    }
}
