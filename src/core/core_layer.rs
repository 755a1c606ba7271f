// The core module contains all business logic.
// Each feature gets its own submodule; nothing in here knows about Discord.

#[path = "persistence.rs"]
pub mod persistence;

#[path = "server_error.rs"]
pub mod server_error;

#[path = "guild_config/mod.rs"]
pub mod guild_config;

#[path = "server_status/mod.rs"]
pub mod server_status;

#[path = "remote_console/mod.rs"]
pub mod remote_console;

#[path = "waypoints/mod.rs"]
pub mod waypoints;
