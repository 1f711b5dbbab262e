use thiserror::Error;

/// Startup and runtime errors of the netkit application
///
/// Request-path failures are `ProxyError`s and never surface here.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
