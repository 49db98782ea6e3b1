//! Console server configuration

use anyhow::{Context, Result};
use serde::Deserialize;

const ENV_PREFIX: &str = "CONSOLE";

/// Console server configuration, read from `CONSOLE_*` environment variables
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ConsoleConfig {
    /// Address the HTTP server binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// HTTP port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allow cross-origin requests from any origin (browser front ends)
    #[serde(default = "default_cors_permissive")]
    pub cors_permissive: bool,

    /// Instance name attached to structured log events
    #[serde(default = "default_instance")]
    pub instance: String,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_cors_permissive() -> bool {
    true
}

fn default_instance() -> String {
    std::env::var("POD_NAME")
        .or_else(|_| std::env::var("HOSTNAME"))
        .unwrap_or_else(|_| "workload-console".to_string())
}

impl ConsoleConfig {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self> {
        Self::from_environment(config::Environment::with_prefix(ENV_PREFIX))
    }

    fn from_environment(env: config::Environment) -> Result<Self> {
        config::Config::builder()
            .add_source(env.try_parsing(true))
            .build()
            .context("Failed to read console configuration")?
            .try_deserialize()
            .context("Invalid console configuration")
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
