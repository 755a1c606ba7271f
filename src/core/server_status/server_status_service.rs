use super::server_status_models::{PlayerList, PlayerListSource, QueryReply, StatusSnapshot};
use crate::core::guild_config::GuildConnectionProfile;
use crate::core::server_error::ServerError;
use async_trait::async_trait;
use std::time::Duration;

/// Unauthenticated read access to a game server.
///
/// Implementations bound every call with a timeout and never retry.
#[async_trait]
pub trait StatusClient: Send + Sync {
    async fn status(&self, host: &str, port: u16) -> Result<StatusSnapshot, ServerError>;
    async fn query(&self, host: &str, port: u16) -> Result<QueryReply, ServerError>;
    async fn ping(&self, host: &str, port: u16) -> Result<Duration, ServerError>;
}

/// Status, player list and ping for a guild's configured server.
///
/// Every failure leaves this service as `ServerError::Unreachable`; the reason
/// is kept for logs but callers only see one outcome.
pub struct ServerStatusService<C: StatusClient> {
    client: C,
}

impl<C: StatusClient> ServerStatusService<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub async fn query_status(
        &self,
        profile: &GuildConnectionProfile,
    ) -> Result<StatusSnapshot, ServerError> {
        self.client
            .status(&profile.host, profile.port)
            .await
            .map_err(|e| unreachable(profile, "status", e))
    }

    /// Prefer the query protocol's full list; fall back to the status sample
    /// when query is disabled, times out or replies with garbage.
    pub async fn query_players(
        &self,
        profile: &GuildConnectionProfile,
    ) -> Result<PlayerList, ServerError> {
        match self.client.query(&profile.host, profile.port).await {
            Ok(reply) => {
                return Ok(PlayerList {
                    online: reply.players_online.max(reply.names.len() as u32),
                    max: reply.players_max,
                    names: reply.names,
                    source: PlayerListSource::Query,
                })
            }
            Err(e) => {
                tracing::debug!(
                    address = %profile.address(),
                    error = %e,
                    "Query protocol unavailable, falling back to status sample"
                );
            }
        }

        let snapshot = self.query_status(profile).await?;
        Ok(PlayerList {
            names: snapshot.sample,
            online: snapshot.players_online,
            max: snapshot.players_max,
            source: PlayerListSource::StatusSample,
        })
    }

    pub async fn ping(&self, profile: &GuildConnectionProfile) -> Result<Duration, ServerError> {
        self.client
            .ping(&profile.host, profile.port)
            .await
            .map_err(|e| unreachable(profile, "ping", e))
    }
}

fn unreachable(profile: &GuildConnectionProfile, operation: &str, err: ServerError) -> ServerError {
    tracing::warn!(address = %profile.address(), operation, error = %err, "Status request failed");
    match err {
        ServerError::Unreachable(reason) => ServerError::Unreachable(reason),
        other => ServerError::Unreachable(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeClient {
        status: Result<StatusSnapshot, ServerError>,
        query: Result<QueryReply, ServerError>,
        status_calls: AtomicUsize,
    }

    #[async_trait]
    impl StatusClient for FakeClient {
        async fn status(&self, _: &str, _: u16) -> Result<StatusSnapshot, ServerError> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            self.status.clone()
        }

        async fn query(&self, _: &str, _: u16) -> Result<QueryReply, ServerError> {
            self.query.clone()
        }

        async fn ping(&self, _: &str, _: u16) -> Result<Duration, ServerError> {
            Err(ServerError::Protocol("bad pong".into()))
        }
    }

    fn snapshot() -> StatusSnapshot {
        StatusSnapshot {
            online: true,
            players_online: 3,
            players_max: 20,
            sample: vec!["Steve".into(), "Alex".into()],
            version: "1.20.4".into(),
            motd: "A Minecraft Server".into(),
            latency: Duration::from_millis(12),
        }
    }

    fn profile() -> GuildConnectionProfile {
        GuildConnectionProfile {
            host: "mc.example.net".into(),
            port: 25565,
            rcon_password: String::new(),
        }
    }

    #[tokio::test]
    async fn players_prefer_query_protocol() {
        let service = ServerStatusService::new(FakeClient {
            status: Ok(snapshot()),
            query: Ok(QueryReply {
                players_online: 3,
                players_max: 20,
                names: vec!["Steve".into(), "Alex".into(), "Herobrine".into()],
            }),
            status_calls: AtomicUsize::new(0),
        });

        let players = service.query_players(&profile()).await.unwrap();
        assert_eq!(players.source, PlayerListSource::Query);
        assert_eq!(players.names.len(), 3);
        assert_eq!(service.client.status_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn players_fall_back_to_status_sample_when_query_disabled() {
        let service = ServerStatusService::new(FakeClient {
            status: Ok(snapshot()),
            query: Err(ServerError::Unreachable("timed out".into())),
            status_calls: AtomicUsize::new(0),
        });

        let players = service.query_players(&profile()).await.unwrap();
        assert_eq!(players.source, PlayerListSource::StatusSample);
        assert_eq!(players.names, vec!["Steve".to_string(), "Alex".to_string()]);
        assert_eq!(players.online, 3);
        assert_eq!(players.max, 20);
    }

    #[tokio::test]
    async fn players_unreachable_when_both_protocols_fail() {
        let service = ServerStatusService::new(FakeClient {
            status: Err(ServerError::Unreachable("connection refused".into())),
            query: Err(ServerError::Protocol("short packet".into())),
            status_calls: AtomicUsize::new(0),
        });

        let err = service.query_players(&profile()).await.unwrap_err();
        assert!(err.is_unreachable());
    }

    #[tokio::test]
    async fn protocol_errors_collapse_to_unreachable() {
        let service = ServerStatusService::new(FakeClient {
            status: Err(ServerError::Protocol("invalid json".into())),
            query: Err(ServerError::Protocol("short packet".into())),
            status_calls: AtomicUsize::new(0),
        });

        assert!(service.query_status(&profile()).await.unwrap_err().is_unreachable());
        assert!(service.ping(&profile()).await.unwrap_err().is_unreachable());
    }
}
