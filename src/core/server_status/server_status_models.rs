use std::time::Duration;

/// One status round trip against a Java-edition server.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshot {
    pub online: bool,
    pub players_online: u32,
    pub players_max: u32,
    /// Names the server chose to embed in its status reply. Often truncated
    /// (vanilla sends at most 12) or absent.
    pub sample: Vec<String>,
    pub version: String,
    pub motd: String,
    pub latency: Duration,
}

/// Where a player list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerListSource {
    Query,
    StatusSample,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerList {
    pub names: Vec<String>,
    pub online: u32,
    pub max: u32,
    pub source: PlayerListSource,
}

/// Raw reply from the query protocol's full-stat request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryReply {
    pub players_online: u32,
    pub players_max: u32,
    pub names: Vec<String>,
}
