pub mod server_status_models;
pub mod server_status_service;

pub use server_status_models::{PlayerListSource, QueryReply, StatusSnapshot};
pub use server_status_service::{ServerStatusService, StatusClient};
