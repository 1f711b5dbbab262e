use crate::domain::config_types::{HistoryCapacity, Host, LogLevel, Port, UpstreamTimeoutSecs};
use crate::proxy::types::ProxyConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub proxy: ProxySettings,
    pub admin: AdminSettings,
    pub history: HistorySettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProxySettings {
    pub host: Host,
    pub port: Port,
    pub upstream_timeout_secs: UpstreamTimeoutSecs,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdminSettings {
    pub host: Host,
    /// `0` disables the admin listener.
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistorySettings {
    pub capacity: HistoryCapacity,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: LogLevel,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let config = Self::defaults()?
            // Add configuration file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with prefix
            .add_source(Environment::with_prefix("NETKIT").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Built-in defaults every other source is layered on top of.
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("proxy.host", "0.0.0.0")?
            .set_default("proxy.port", 8080)?
            .set_default("proxy.upstream_timeout_secs", 30)?
            .set_default("admin.host", "0.0.0.0")?
            .set_default("admin.port", 0)?
            .set_default("history.capacity", 1000)?
            .set_default("logging.level", "info")
    }

    /// Build settings from the defaults plus a single in-memory source.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    pub fn proxy_address(&self) -> String {
        format!("{}:{}", self.proxy.host, self.proxy.port)
    }

    /// Admin listen address, or `None` when the admin surface is disabled.
    pub fn admin_address(&self) -> Option<String> {
        (self.admin.port != 0).then(|| format!("{}:{}", self.admin.host, self.admin.port))
    }

    pub fn to_proxy_config(&self) -> ProxyConfig {
        ProxyConfig {
            upstream_timeout: Duration::from_secs(*self.proxy.upstream_timeout_secs.as_ref()),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new().expect("Failed to load configuration")
    }
}
