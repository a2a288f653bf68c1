use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::{
    AppState,
    infrastructure::AuthService,
    middleware::{AuthGuard, assign_request_id, authorize, log_errors},
    routes,
};

pub const API_BASE_URI: &str = "/api";

// 公开路由，不需要令牌
fn public_routes<B: AuthService + Send + Sync + 'static>() -> Router<AppState<B>> {
    Router::new()
        .route("/users/register", post(routes::user::register::<B>))
        .route("/users/login", post(routes::user::login::<B>))
        .route("/users/refresh", post(routes::user::refresh_token::<B>))
        .route("/ping", get(routes::user::ping::<B>))
}

// 管理员路由
fn admin_routes<B: AuthService + Send + Sync + 'static>(state: &AppState<B>) -> Router<AppState<B>> {
    Router::new()
        .route("/users/{id}/ban", put(routes::user::set_banned::<B>))
        .route("/users/{id}/delete", put(routes::user::set_deleted::<B>))
        .route("/users/{id}/admin", put(routes::user::set_admin::<B>))
        .route_layer(from_fn_with_state(
            AuthGuard::admin(state.verifier.clone()),
            authorize,
        ))
}

/// 组装完整的网关路由
pub fn create_router<B: AuthService + Send + Sync + 'static>(state: AppState<B>) -> Router {
    let router = Router::new().nest(
        API_BASE_URI,
        Router::new()
            .merge(public_routes())
            .merge(admin_routes(&state)),
    );

    // 关联ID在最外层，其余中间件的日志都落在请求 span 里
    let router = router
        .layer(from_fn(log_errors))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(assign_request_id));

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    router.with_state(state)
}
