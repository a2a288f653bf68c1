use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;

use crate::common::RequestId;

pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// 为每个请求生成关联ID
///
/// ID 写入请求扩展供处理器读取，同时挂到本次请求的日志 span 上，
/// 并通过 `x-request-id` 响应头返回给调用方。
pub async fn assign_request_id(mut req: Request<Body>, next: Next) -> Response {
    let request_id = RequestId::new();
    req.extensions_mut().insert(request_id.clone());

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    let mut response = next.run(req).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        response.headers_mut().insert(X_REQUEST_ID.clone(), value);
    }
    response
}
