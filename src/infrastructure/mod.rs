pub mod auth;
pub mod grpc;

pub use auth::{AuthError, CallerIdentity, Claims, TokenVerifier};
pub use grpc::{AuthClient, AuthService, LocalAuthService};
