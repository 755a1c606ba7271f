// Minecraft Java-edition network clients.

pub mod codec;
pub mod query;
pub mod rcon_client;
pub mod slp;
pub mod status_client;

pub use rcon_client::TcpRconClient;
pub use status_client::JavaStatusClient;
