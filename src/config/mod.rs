//! Client configuration.

mod retry;

pub use retry::RetryConfig;
