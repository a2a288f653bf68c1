use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{error, info, warn};

use crate::{
    AppState,
    common::RequestId,
    error::{ApiError, BackendError},
    infrastructure::{AuthService, CallerIdentity},
    utils::{ValidJson, success_to_api_response},
};

use super::model::{
    LoginRequest, PingResponse, RefreshRequest, RegisterRequest, RegisterResponse,
    SetAdminRequest, SetAdminResponse, SetBannedRequest, SetBannedResponse, SetDeletedRequest,
    SetDeletedResponse,
};

/// 每个接口的日志名称和固定响应文案
struct Operation {
    name: &'static str,
    success: &'static str,
    precondition: &'static str,
    failure: &'static str,
}

const REGISTER: Operation = Operation {
    name: "register",
    success: "register success",
    precondition: "user already exists",
    failure: "register failed",
};

const LOGIN: Operation = Operation {
    name: "login",
    success: "login success",
    precondition: "user is unable to log in",
    failure: "login failed",
};

const REFRESH: Operation = Operation {
    name: "refresh",
    success: "refresh success",
    precondition: "user is unable to log in",
    failure: "refresh failed",
};

const SET_BANNED: Operation = Operation {
    name: "set_banned",
    success: "set banned flag successfully",
    precondition: "user does not exist",
    failure: "failed to set banned flag",
};

const SET_DELETED: Operation = Operation {
    name: "set_deleted",
    success: "set deleted flag successfully",
    precondition: "user does not exist",
    failure: "failed to set deleted flag",
};

const SET_ADMIN: Operation = Operation {
    name: "set_admin",
    success: "admin flag set successfully",
    precondition: "user does not exist",
    failure: "failed to set admin flag",
};

pub const INVALID_USER_ID: &str = "invalid user id";
pub const SELF_ACTION: &str = "user cannot apply this action to themselves";

/// 把后端失败映射为对外错误
fn backend_failure(op: &Operation, err: BackendError) -> ApiError {
    match err {
        BackendError::FailedPrecondition(reason) => {
            info!(op = op.name, %reason, "backend rejected request");
            ApiError::bad_request(op.precondition)
        }
        // 网关总会带上关联ID，出现这个错误说明调用本身有问题
        BackendError::InvalidArgument(reason) => {
            error!(op = op.name, %reason, "backend reported invalid argument, request id metadata missing?");
            ApiError::internal(op.failure)
        }
        BackendError::Other { code, message } => {
            error!(op = op.name, ?code, %message, "backend call failed");
            ApiError::internal(op.failure)
        }
        BackendError::Transport(reason) => {
            error!(op = op.name, %reason, "backend unreachable");
            ApiError::internal(op.failure)
        }
    }
}

/// 解析路径中的目标用户ID，不允许对自己操作
fn target_user(raw: &str, caller: &CallerIdentity) -> Result<i64, ApiError> {
    let user_id: i64 = raw.parse().map_err(|_| {
        warn!(raw, "invalid user id in path");
        ApiError::bad_request(INVALID_USER_ID)
    })?;

    if user_id == caller.user_id {
        warn!(user_id, "self-targeted privilege change rejected");
        return Err(ApiError::bad_request(SELF_ACTION));
    }

    Ok(user_id)
}

pub async fn register<B: AuthService + Send + Sync + 'static>(
    State(state): State<AppState<B>>,
    Extension(request_id): Extension<RequestId>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = state
        .auth
        .register(&request_id, &req.email, &req.password)
        .await
        .map_err(|e| backend_failure(&REGISTER, e))?;

    info!(user_id, "user registered");
    Ok((
        StatusCode::OK,
        success_to_api_response(RegisterResponse { user_id }, REGISTER.success),
    ))
}

pub async fn login<B: AuthService + Send + Sync + 'static>(
    State(state): State<AppState<B>>,
    Extension(request_id): Extension<RequestId>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let tokens = state
        .auth
        .login(&request_id, &req.email, &req.password)
        .await
        .map_err(|e| backend_failure(&LOGIN, e))?;

    Ok((
        StatusCode::OK,
        success_to_api_response(tokens, LOGIN.success),
    ))
}

pub async fn refresh_token<B: AuthService + Send + Sync + 'static>(
    State(state): State<AppState<B>>,
    Extension(request_id): Extension<RequestId>,
    ValidJson(req): ValidJson<RefreshRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let tokens = state
        .auth
        .refresh_token(&request_id, &req.refresh_token)
        .await
        .map_err(|e| backend_failure(&REFRESH, e))?;

    Ok((
        StatusCode::OK,
        success_to_api_response(tokens, REFRESH.success),
    ))
}

pub async fn set_banned<B: AuthService + Send + Sync + 'static>(
    State(state): State<AppState<B>>,
    Extension(request_id): Extension<RequestId>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<SetBannedRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = target_user(&id, &caller)?;
    let flag = req.is_banned.unwrap_or_default();

    let is_banned = state
        .auth
        .set_banned(&request_id, user_id, flag)
        .await
        .map_err(|e| backend_failure(&SET_BANNED, e))?;

    info!(admin_id = caller.user_id, user_id, is_banned, "banned flag updated");
    Ok((
        StatusCode::OK,
        success_to_api_response(SetBannedResponse { is_banned }, SET_BANNED.success),
    ))
}

pub async fn set_deleted<B: AuthService + Send + Sync + 'static>(
    State(state): State<AppState<B>>,
    Extension(request_id): Extension<RequestId>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<SetDeletedRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = target_user(&id, &caller)?;
    let flag = req.is_deleted.unwrap_or_default();

    let is_deleted = state
        .auth
        .set_deleted(&request_id, user_id, flag)
        .await
        .map_err(|e| backend_failure(&SET_DELETED, e))?;

    info!(admin_id = caller.user_id, user_id, is_deleted, "deleted flag updated");
    Ok((
        StatusCode::OK,
        success_to_api_response(SetDeletedResponse { is_deleted }, SET_DELETED.success),
    ))
}

pub async fn set_admin<B: AuthService + Send + Sync + 'static>(
    State(state): State<AppState<B>>,
    Extension(request_id): Extension<RequestId>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<SetAdminRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = target_user(&id, &caller)?;
    let flag = req.is_admin.unwrap_or_default();

    let is_admin = state
        .auth
        .set_admin(&request_id, user_id, flag)
        .await
        .map_err(|e| backend_failure(&SET_ADMIN, e))?;

    info!(admin_id = caller.user_id, user_id, is_admin, "admin flag updated");
    Ok((
        StatusCode::OK,
        success_to_api_response(SetAdminResponse { is_admin }, SET_ADMIN.success),
    ))
}

pub async fn ping<B: AuthService + Send + Sync + 'static>(
    State(state): State<AppState<B>>,
) -> impl IntoResponse {
    (
        StatusCode::OK,
        success_to_api_response(
            PingResponse {
                status: "ok",
                service: state.config.service_name.clone(),
                timestamp: chrono::Utc::now().timestamp(),
            },
            "ok",
        ),
    )
}
