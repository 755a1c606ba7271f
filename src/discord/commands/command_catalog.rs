// Discord commands module.
// Each feature gets its own command file.
//
// **Notice the pattern:**
// 1. Extract primitive data from Discord types
// 2. Call core service
// 3. Format the response based on the result
//
// This layer is THIN - no business logic, just translation.

pub mod config;
pub mod help;
pub mod replies;
pub mod server_info;
pub mod stats;
pub mod waypoints;

use crate::core::guild_config::{GuildConfigDocument, GuildConfigService};
use crate::core::remote_console::RemoteConsoleService;
use crate::core::server_status::ServerStatusService;
use crate::core::waypoints::{WaypointDocument, WaypointService};
use crate::infra::minecraft::{JavaStatusClient, TcpRconClient};
use crate::infra::storage::JsonDocumentStore;
use std::sync::Arc;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Shared state handed to every command. Built once in `main`.
pub struct Data {
    pub guild_config: Arc<GuildConfigService<JsonDocumentStore<GuildConfigDocument>>>,
    pub status: Arc<ServerStatusService<JavaStatusClient>>,
    pub rcon: Arc<RemoteConsoleService<TcpRconClient>>,
    pub waypoints: Arc<WaypointService<JsonDocumentStore<WaypointDocument>>>,
}

/// Every command the bot registers, in help order.
pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        waypointadd(),
        waypoints::waypointremove(),
        waypoints::waypoints(),
        waypoints::waypointinfo(),
        config::config(),
        config::setserverinfo(),
        config::prefix(),
        config::configshow(),
        server_info::mcstatus(),
        server_info::mcplayers(),
        server_info::mcinfo(),
        server_info::mcping(),
        server_info::mctime(),
        server_info::mcseed(),
        server_info::mcstop(),
        stats::mcobjs(),
        stats::mcstat(),
        stats::mcleaderboard(),
        help::help(),
    ]
}

/// Slash and prefix `waypointadd` take different arguments, so the prefix
/// parser is attached to the slash command under the same name.
fn waypointadd() -> poise::Command<Data, Error> {
    let mut command = waypoints::waypointadd();
    command.prefix_action = waypoints::waypointadd_prefix().prefix_action;
    command
}
