use super::scoreboard::{self, ScoreEntry};
use crate::core::guild_config::GuildConnectionProfile;
use crate::core::server_error::ServerError;
use async_trait::async_trait;

/// One-shot RCON transport: connect, authenticate, run one command, close.
///
/// Sessions are never reused; each call authenticates from scratch.
#[async_trait]
pub trait RconClient: Send + Sync {
    async fn run(
        &self,
        host: &str,
        port: u16,
        password: &str,
        command: &str,
    ) -> Result<String, ServerError>;
}

/// Runs remote-console commands against a guild's configured server.
pub struct RemoteConsoleService<C: RconClient> {
    client: C,
}

impl<C: RconClient> RemoteConsoleService<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Send `command` verbatim and return the server's reply text.
    ///
    /// Fails with `NotConfigured` before touching the network when the profile
    /// has no password.
    pub async fn execute(
        &self,
        profile: &GuildConnectionProfile,
        command: &str,
    ) -> Result<String, ServerError> {
        if !profile.has_rcon() {
            return Err(ServerError::NotConfigured);
        }

        let result = self
            .client
            .run(&profile.host, profile.port, &profile.rcon_password, command)
            .await;

        match &result {
            Ok(_) => tracing::debug!(address = %profile.address(), command, "RCON command completed"),
            Err(e) => tracing::warn!(address = %profile.address(), command, error = %e, "RCON command failed"),
        }

        result
    }

    pub async fn time_of_day(&self, profile: &GuildConnectionProfile) -> Result<String, ServerError> {
        self.execute(profile, "time query daytime").await
    }

    pub async fn seed(&self, profile: &GuildConnectionProfile) -> Result<String, ServerError> {
        self.execute(profile, "seed").await
    }

    pub async fn stop(&self, profile: &GuildConnectionProfile) -> Result<String, ServerError> {
        self.execute(profile, "stop").await
    }

    pub async fn objectives(
        &self,
        profile: &GuildConnectionProfile,
    ) -> Result<Vec<String>, ServerError> {
        let reply = self.execute(profile, "scoreboard objectives list").await?;
        Ok(scoreboard::parse_objectives(&reply))
    }

    pub async fn player_score(
        &self,
        profile: &GuildConnectionProfile,
        player: &str,
        objective: &str,
    ) -> Result<i64, ServerError> {
        check_token("player", player)?;
        check_token("objective", objective)?;
        let reply = self
            .execute(profile, &format!("scoreboard players get {} {}", player, objective))
            .await?;
        Ok(scoreboard::parse_score(&reply))
    }

    pub async fn leaderboard(
        &self,
        profile: &GuildConnectionProfile,
        objective: &str,
        count: usize,
    ) -> Result<Vec<ScoreEntry>, ServerError> {
        check_token("objective", objective)?;
        if count == 0 {
            return Err(ServerError::Validation(
                "`count` must be at least 1.".to_string(),
            ));
        }
        let reply = self
            .execute(profile, &format!("scoreboard players list {}", objective))
            .await?;
        let mut entries = scoreboard::parse_leaderboard(&reply);
        entries.truncate(count);
        Ok(entries)
    }
}

// Player and objective names are single words; anything else would splice
// extra arguments into the command line.
fn check_token(field: &str, value: &str) -> Result<(), ServerError> {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return Err(ServerError::Validation(format!(
            "`{}` must be a single word.",
            field
        )));
    }
    Ok(())
}
