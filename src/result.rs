use serde::{Deserialize, Serialize};

/// 统一响应信封，所有接口都返回 `{message, data}`
///
/// 出错时 `data` 固定为 `null`。
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResult<T> {
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResult<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResult<()> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }
}
