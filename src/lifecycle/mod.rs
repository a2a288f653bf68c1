pub mod shutdown;

pub use shutdown::{serve, serve_until, shutdown_signal};
