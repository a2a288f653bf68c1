use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value {value:?} for environment variable {var}")]
    Invalid { var: &'static str, value: String },
}

/// `LOG_ENV` 取该值时按生产环境运行
pub const PROD_ENV: &str = "prod";

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub env: String,
    pub auth_addr: String,
    pub token_secret: String,
    pub service_name: String,
    pub server_host: IpAddr,
    pub auth_timeout_secs: u64,
    pub auth_connect_timeout_secs: u64,
    pub shutdown_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源解析配置，测试中不必改动进程环境变量
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| -> Result<String, ConfigError> {
            lookup(var)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(var))
        };
        let optional = |var: &'static str, default: &str| -> String {
            lookup(var)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Ok(Config {
            port: parse("HTTP_PORT", required("HTTP_PORT")?)?,
            env: optional("LOG_ENV", "dev"),
            auth_addr: required("AUTH_ADDR")?,
            token_secret: required("TOKEN_SECRET")?,
            service_name: optional("SERVICE_NAME", "apigw-ext"),
            server_host: parse("SERVER_HOST", optional("SERVER_HOST", "0.0.0.0"))?,
            auth_timeout_secs: parse("AUTH_TIMEOUT_SECS", optional("AUTH_TIMEOUT_SECS", "5"))?,
            auth_connect_timeout_secs: parse(
                "AUTH_CONNECT_TIMEOUT_SECS",
                optional("AUTH_CONNECT_TIMEOUT_SECS", "5"),
            )?,
            shutdown_timeout_secs: parse(
                "SHUTDOWN_TIMEOUT_SECS",
                optional("SHUTDOWN_TIMEOUT_SECS", "5"),
            )?,
        })
    }

    pub fn is_prod(&self) -> bool {
        self.env == PROD_ENV
    }

    pub fn auth_timeout(&self) -> Duration {
        Duration::from_secs(self.auth_timeout_secs)
    }

    pub fn auth_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.auth_connect_timeout_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// 监听地址
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server_host, self.port)
    }
}

fn parse<T: FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { var, value })
}

// 密钥不进日志
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("env", &self.env)
            .field("auth_addr", &self.auth_addr)
            .field("token_secret", &"<redacted>")
            .field("service_name", &self.service_name)
            .field("server_host", &self.server_host)
            .field("auth_timeout_secs", &self.auth_timeout_secs)
            .field("auth_connect_timeout_secs", &self.auth_connect_timeout_secs)
            .field("shutdown_timeout_secs", &self.shutdown_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("HTTP_PORT", "8080"),
        ("AUTH_ADDR", "localhost:44044"),
        ("TOKEN_SECRET", "secret"),
    ];

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.env, "dev");
        assert_eq!(config.service_name, "apigw-ext");
        assert_eq!(config.listen_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.auth_timeout(), Duration::from_secs(5));
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(5));
        assert!(!config.is_prod());
    }

    #[test]
    fn test_missing_required_variable() {
        let err = Config::from_lookup(lookup(&REQUIRED[..2])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("TOKEN_SECRET"));

        let err = Config::from_lookup(lookup(&[("AUTH_ADDR", "a"), ("TOKEN_SECRET", "s")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::Missing("HTTP_PORT"));
    }

    #[test]
    fn test_invalid_number() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("AUTH_TIMEOUT_SECS", "soon"));
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                var: "AUTH_TIMEOUT_SECS",
                value: "soon".into()
            }
        );
    }

    #[test]
    fn test_server_host_must_be_an_ip_address() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SERVER_HOST", "localhost"));
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                var: "SERVER_HOST",
                value: "localhost".into()
            }
        );

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SERVER_HOST", "::1"));
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.listen_addr().to_string(), "[::1]:8080");
    }

    #[test]
    fn test_overrides_and_redacted_debug() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("LOG_ENV", "prod"));
        pairs.push(("SERVICE_NAME", "edge"));
        let config = Config::from_lookup(lookup(&pairs)).unwrap();

        assert!(config.is_prod());
        assert_eq!(config.service_name, "edge");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("\"secret\""));
        assert!(debug.contains("<redacted>"));
    }
}
