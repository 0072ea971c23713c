//! Server configuration loaded from the environment.
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use runtime::{NeynarConfig, RuntimeConfig};

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Redis connection string; the in-memory store is used without it.
    pub redis_url: Option<String>,
    /// Directory API settings; a static empty directory is used without them.
    pub neynar: Option<NeynarConfig>,
    /// Overrides the platform cache directory for log files.
    pub log_dir: Option<PathBuf>,
    pub runtime: RuntimeConfig,
}

impl ServerConfig {
    pub const DEFAULT_BIND_ADDR: &'static str = "0.0.0.0:3000";

    /// Construct configuration from process environment variables.
    ///
    /// - `BIND_ADDR`
    /// - `REDIS_URL`
    /// - `NEYNAR_API_KEY` / `NEYNAR_BASE_URL` / `NEYNAR_SIGNER_UUID`
    /// - `LOG_DIR`
    /// - everything [`RuntimeConfig::from_env`] reads
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(addr) = read_env::<SocketAddr>("BIND_ADDR") {
            config.bind_addr = addr;
        }

        config.redis_url = non_empty("REDIS_URL");

        config.neynar = non_empty("NEYNAR_API_KEY").map(|key| {
            let mut neynar = NeynarConfig::new(key);
            if let Some(base_url) = non_empty("NEYNAR_BASE_URL") {
                neynar = neynar.with_base_url(base_url);
            }
            if let Some(signer) = non_empty("NEYNAR_SIGNER_UUID") {
                neynar = neynar.with_signer(signer);
            }
            neynar
        });

        config.log_dir = non_empty("LOG_DIR").map(PathBuf::from);
        config.runtime = RuntimeConfig::from_env();

        config
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            redis_url: None,
            neynar: None,
            log_dir: None,
            runtime: RuntimeConfig::default(),
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
