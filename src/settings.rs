// Process configuration, read once at startup from the environment (and `.env`).

use crate::core::guild_config::guild_config_models::{DEFAULT_HOST, DEFAULT_PORT, DEFAULT_PREFIX};
use crate::core::guild_config::ConnectionDefaults;
use anyhow::anyhow;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone)]
pub struct BotSettings {
    pub discord_token: String,
    pub defaults: ConnectionDefaults,
    pub network_timeout: Duration,
    pub server_config_path: PathBuf,
    pub waypoints_path: PathBuf,
}

impl BotSettings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                anyhow!("Missing DISCORD_TOKEN environment variable! Create a .env file with your bot token.")
            })?;

        let defaults = ConnectionDefaults {
            host: lookup("MC_IP")
                .filter(|h| !h.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or("MC_PORT", lookup("MC_PORT"), DEFAULT_PORT),
            rcon_password: lookup("MC_RCON_PASSWORD").unwrap_or_default(),
            prefix: DEFAULT_PREFIX.to_string(),
        };

        let timeout_secs = parse_or(
            "MC_TIMEOUT_SECS",
            lookup("MC_TIMEOUT_SECS"),
            DEFAULT_TIMEOUT_SECS,
        )
        .max(1);

        Ok(Self {
            discord_token,
            defaults,
            network_timeout: Duration::from_secs(timeout_secs),
            server_config_path: lookup("SERVER_CFG_PATH")
                .unwrap_or_else(|| "server_configs.json".to_string())
                .into(),
            waypoints_path: lookup("WAYPOINTS_PATH")
                .unwrap_or_else(|| "waypoints.json".to_string())
                .into(),
        })
    }
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(key: &str, raw: Option<String>, fallback: T) -> T {
    match raw {
        None => fallback,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {}={:?}, using {}", key, raw, fallback);
            fallback
        }),
    }
}
