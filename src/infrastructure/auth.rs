use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("bad header value given")]
    BadHeaderValue,
    #[error("incorrectly formatted authorization header")]
    MalformedHeader,
    #[error("bad signed method received")]
    BadSigningMethod,
    #[error("bad jwt token")]
    BadToken,
    #[error("You are not authorized for this operation")]
    NotAdmin,
}

/// 令牌声明：标准声明之外附带用户ID、邮箱和管理员标记
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
}

/// 调用方身份，每个请求从令牌重新构建，不做持久化
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_id: i64,
    pub is_admin: bool,
    pub email: Option<String>,
}

impl From<Claims> for CallerIdentity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.id,
            // 缺少管理员声明按非管理员处理
            is_admin: claims.is_admin.unwrap_or(false),
            email: claims.email,
        }
    }
}

const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// 读取令牌头部声明的算法名
///
/// `none` 等 jsonwebtoken 不认识的算法同样返回原始名称。
fn header_algorithm(token: &str) -> Option<String> {
    let segment = token.split('.').next()?;
    let bytes = URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .ok()?;
    serde_json::from_slice::<RawHeader>(&bytes)
        .ok()
        .map(|header| header.alg)
}

fn hmac_algorithm(name: &str) -> Option<Algorithm> {
    match name {
        "HS256" => Some(Algorithm::HS256),
        "HS384" => Some(Algorithm::HS384),
        "HS512" => Some(Algorithm::HS512),
        _ => None,
    }
}

/// 使用共享密钥校验 HMAC 签名的令牌
pub struct TokenVerifier {
    key: DecodingKey,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// 解析 `Authorization` 头并校验其中的令牌
    pub fn authenticate(&self, header: Option<&str>) -> Result<CallerIdentity, AuthError> {
        let token = extract_bearer_token(header)?;
        self.verify_token(token)
    }

    pub fn verify_token(&self, token: &str) -> Result<CallerIdentity, AuthError> {
        let name = header_algorithm(token).ok_or(AuthError::BadToken)?;
        let alg = hmac_algorithm(&name).ok_or_else(|| {
            tracing::debug!(alg = %name, "token signed with non-HMAC algorithm");
            AuthError::BadSigningMethod
        })?;

        let mut validation = Validation::new(alg);
        validation.algorithms = HMAC_ALGORITHMS.to_vec();
        // exp 可选，出现时才校验
        validation.required_spec_claims.clear();
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.key, &validation).map_err(|e| {
            tracing::debug!(error = %e, "token rejected");
            AuthError::BadToken
        })?;

        Ok(data.claims.into())
    }
}

/// 取出 `<scheme> <token>` 中的令牌部分，scheme 本身不做校验
pub fn extract_bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = match header {
        Some(h) if !h.is_empty() => h,
        _ => return Err(AuthError::BadHeaderValue),
    };

    let parts: Vec<&str> = header.split(' ').collect();
    if parts.len() != 2 {
        return Err(AuthError::MalformedHeader);
    }

    Ok(parts[1])
}
