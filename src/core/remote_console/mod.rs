pub mod remote_console_service;
pub mod scoreboard;

pub use remote_console_service::{RconClient, RemoteConsoleService};
