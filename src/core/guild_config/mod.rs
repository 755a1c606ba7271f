pub mod config_args;
pub mod guild_config_models;
pub mod guild_config_service;

pub use config_args::parse_config_args;
pub use guild_config_models::{
    ConfigUpdate, ConnectionDefaults, GuildConfigDocument, GuildConnectionProfile,
};
pub use guild_config_service::{ConfigError, GuildConfigService};
