use std::sync::Arc;

use config::Config;
use infrastructure::{AuthService, TokenVerifier};

pub mod common;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod lifecycle;
pub mod logging;
pub mod middleware;
pub mod result;
pub mod router;
pub mod routes;
pub mod utils;

/// 处理器共享的应用状态，启动时构建一次
pub struct AppState<B> {
    pub config: Arc<Config>,
    pub auth: Arc<B>,
    pub verifier: Arc<TokenVerifier>,
}

impl<B: AuthService> AppState<B> {
    pub fn new(config: Config, auth: B) -> Self {
        let verifier = TokenVerifier::new(&config.token_secret);
        Self {
            config: Arc::new(config),
            auth: Arc::new(auth),
            verifier: Arc::new(verifier),
        }
    }
}

// 手写 Clone，后端实现本身不需要 Clone
impl<B> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            auth: self.auth.clone(),
            verifier: self.verifier.clone(),
        }
    }
}
