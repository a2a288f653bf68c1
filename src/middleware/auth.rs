use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::infrastructure::{AuthError, TokenVerifier};

/// 管理员路由的认证中间件状态
#[derive(Clone)]
pub struct AuthGuard {
    verifier: Arc<TokenVerifier>,
}

impl AuthGuard {
    pub fn admin(verifier: Arc<TokenVerifier>) -> Self {
        Self { verifier }
    }
}

/// 校验 `Authorization` 头和管理员声明，并把调用方身份放进请求扩展
///
/// 任一步失败都直接返回 401，后续处理器不会执行。
pub async fn authorize(
    State(guard): State<AuthGuard>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let identity = guard.verifier.authenticate(header).map_err(|e| {
        tracing::info!(error = %e, "authentication failed");
        e
    })?;

    if !identity.is_admin {
        tracing::info!(user_id = identity.user_id, "admin access denied");
        return Err(AuthError::NotAdmin.into());
    }

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}
