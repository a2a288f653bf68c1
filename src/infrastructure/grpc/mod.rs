mod client;

/// `auth.Auth` 服务的生成代码
pub mod proto {
    tonic::include_proto!("auth");
}

pub use client::AuthClient;

use crate::common::{RequestId, TokenPair};
use crate::error::BackendError;

/// 认证后端的调用接口
///
/// 每个方法都带上本次请求的关联ID，由实现方随调用一起发往后端。
/// 网关处理器只依赖这个 trait，测试中可以换成内存实现。
#[trait_variant::make(AuthService: Send)]
pub trait LocalAuthService {
    /// 注册，返回新用户ID
    async fn register(
        &self,
        request_id: &RequestId,
        email: &str,
        password: &str,
    ) -> Result<i64, BackendError>;

    async fn login(
        &self,
        request_id: &RequestId,
        email: &str,
        password: &str,
    ) -> Result<TokenPair, BackendError>;

    async fn refresh_token(
        &self,
        request_id: &RequestId,
        refresh_token: &str,
    ) -> Result<TokenPair, BackendError>;

    /// 设置封禁标记，返回后端确认后的值
    async fn set_banned(
        &self,
        request_id: &RequestId,
        user_id: i64,
        is_banned: bool,
    ) -> Result<bool, BackendError>;

    async fn set_deleted(
        &self,
        request_id: &RequestId,
        user_id: i64,
        is_deleted: bool,
    ) -> Result<bool, BackendError>;

    async fn set_admin(
        &self,
        request_id: &RequestId,
        user_id: i64,
        is_admin: bool,
    ) -> Result<bool, BackendError>;
}
