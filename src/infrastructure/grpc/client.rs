use std::time::Duration;

use tonic::{
    metadata::{Ascii, MetadataValue},
    transport::{Channel, Endpoint},
};

use super::{
    AuthService,
    proto::{self, auth_client::AuthClient as GrpcAuthClient},
};
use crate::common::{RequestId, TokenPair};
use crate::error::BackendError;

/// 关联ID在 gRPC 元数据中的键
pub const REQUEST_ID_METADATA_KEY: &str = "requestid";

/// 认证服务客户端
///
/// 包装生成的 gRPC 客户端，内部持有一条 HTTP/2 通道，克隆出的句柄共享同一连接。
#[derive(Clone)]
pub struct AuthClient {
    inner: GrpcAuthClient<Channel>,
}

impl AuthClient {
    /// 建立到认证服务的连接，地址可以省略 `http://` 前缀
    pub async fn connect(
        addr: &str,
        connect_timeout: Duration,
        timeout: Duration,
    ) -> Result<Self, tonic::transport::Error> {
        let uri = if addr.contains("://") {
            addr.to_string()
        } else {
            format!("http://{addr}")
        };

        let channel = Endpoint::from_shared(uri)?
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .connect()
            .await?;

        Ok(Self {
            inner: GrpcAuthClient::new(channel),
        })
    }
}

/// 构造带关联ID元数据的请求
fn with_request_id<T>(request_id: &RequestId, message: T) -> Result<tonic::Request<T>, BackendError> {
    let value = request_id
        .as_str()
        .parse::<MetadataValue<Ascii>>()
        .map_err(|e| BackendError::Transport(format!("invalid request id metadata: {e}")))?;

    let mut request = tonic::Request::new(message);
    request
        .metadata_mut()
        .insert(REQUEST_ID_METADATA_KEY, value);
    Ok(request)
}

impl AuthService for AuthClient {
    async fn register(
        &self,
        request_id: &RequestId,
        email: &str,
        password: &str,
    ) -> Result<i64, BackendError> {
        let request = with_request_id(
            request_id,
            proto::RegisterRequest {
                email: email.to_string(),
                password: password.to_string(),
            },
        )?;
        let resp = self.inner.clone().register(request).await?.into_inner();
        Ok(resp.user_id)
    }

    async fn login(
        &self,
        request_id: &RequestId,
        email: &str,
        password: &str,
    ) -> Result<TokenPair, BackendError> {
        let request = with_request_id(
            request_id,
            proto::LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            },
        )?;
        let resp = self.inner.clone().login(request).await?.into_inner();
        Ok(TokenPair {
            access_token: resp.access_token,
            refresh_token: resp.refresh_token,
        })
    }

    async fn refresh_token(
        &self,
        request_id: &RequestId,
        refresh_token: &str,
    ) -> Result<TokenPair, BackendError> {
        let request = with_request_id(
            request_id,
            proto::RefreshRequest {
                refresh_token: refresh_token.to_string(),
            },
        )?;
        let resp = self.inner.clone().refresh(request).await?.into_inner();
        Ok(TokenPair {
            access_token: resp.access_token,
            refresh_token: resp.refresh_token,
        })
    }

    async fn set_banned(
        &self,
        request_id: &RequestId,
        user_id: i64,
        is_banned: bool,
    ) -> Result<bool, BackendError> {
        let request = with_request_id(request_id, proto::SetBannedRequest { user_id, is_banned })?;
        let resp = self.inner.clone().set_banned(request).await?.into_inner();
        Ok(resp.is_banned)
    }

    async fn set_deleted(
        &self,
        request_id: &RequestId,
        user_id: i64,
        is_deleted: bool,
    ) -> Result<bool, BackendError> {
        let request =
            with_request_id(request_id, proto::SetDeletedRequest { user_id, is_deleted })?;
        let resp = self.inner.clone().set_deleted(request).await?.into_inner();
        Ok(resp.is_deleted)
    }

    async fn set_admin(
        &self,
        request_id: &RequestId,
        user_id: i64,
        is_admin: bool,
    ) -> Result<bool, BackendError> {
        let request = with_request_id(request_id, proto::SetAdminRequest { user_id, is_admin })?;
        let resp = self.inner.clone().set_admin(request).await?.into_inner();
        Ok(resp.is_admin)
    }
}
