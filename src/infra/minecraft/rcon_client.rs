// RCON sessions on top of the `rcon` crate. The TCP connect is done here so
// connectivity failures stay distinct from login failures. One session per command.

use crate::core::remote_console::RconClient;
use crate::core::server_error::ServerError;
use async_trait::async_trait;
use rcon::Connection;
use std::io::ErrorKind;
use std::time::Duration;
use tokio::net::TcpStream;

/// Longest command a Minecraft server accepts in one packet.
const MAX_COMMAND_LEN: usize = 1413;

/// Where a session is. It ends in `Closed` or `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Authenticating,
    AwaitingReply,
    Closed,
    Failed(ServerError),
}

pub struct TcpRconClient {
    timeout: Duration,
}

impl TcpRconClient {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run one session and report the state it finished in.
    async fn attempt(
        &self,
        host: &str,
        port: u16,
        password: &str,
        command: &str,
    ) -> (SessionState, Result<String, ServerError>) {
        let mut state = SessionState::Idle;
        let outcome = tokio::time::timeout(
            self.timeout,
            session(&mut state, host, port, password, command),
        )
        .await
        .unwrap_or_else(|_| {
            Err(ServerError::Unreachable(format!(
                "timed out after {}ms",
                self.timeout.as_millis()
            )))
        });

        if let Err(e) = &outcome {
            let reached = std::mem::replace(&mut state, SessionState::Failed(e.clone()));
            tracing::debug!(host, port, ?reached, error = %e, "RCON session failed");
        }
        (state, outcome)
    }
}

async fn session(
    state: &mut SessionState,
    host: &str,
    port: u16,
    password: &str,
    command: &str,
) -> Result<String, ServerError> {
    *state = SessionState::Connecting;
    let stream = TcpStream::connect((host, port))
        .await
        .map_err(|e| classify(state, e))?;

    *state = SessionState::Authenticating;
    let mut conn = Connection::<TcpStream>::builder()
        .enable_minecraft_quirks(true)
        .handshake(stream, password)
        .await
        .map_err(|e| from_rcon(state, e))?;

    *state = SessionState::AwaitingReply;
    let reply = conn.cmd(command).await.map_err(|e| from_rcon(state, e))?;

    *state = SessionState::Closed;
    Ok(reply)
}

#[async_trait]
impl RconClient for TcpRconClient {
    async fn run(
        &self,
        host: &str,
        port: u16,
        password: &str,
        command: &str,
    ) -> Result<String, ServerError> {
        if command.len() > MAX_COMMAND_LEN {
            return Err(ServerError::Validation("Command is too long.".to_string()));
        }
        self.attempt(host, port, password, command).await.1
    }
}

fn from_rcon(state: &SessionState, err: rcon::Error) -> ServerError {
    match err {
        rcon::Error::Auth => ServerError::AuthenticationFailed,
        rcon::Error::CommandTooLong => ServerError::Validation("Command is too long.".to_string()),
        rcon::Error::Io(e) => classify(state, e),
    }
}

/// Map an I/O failure to a taxonomy kind based on how far the session got.
fn classify(state: &SessionState, err: std::io::Error) -> ServerError {
    match (state, err.kind()) {
        (_, ErrorKind::InvalidData) => ServerError::Protocol(err.to_string()),
        // The TCP connection was accepted, so a hang-up here is the server
        // refusing the login rather than a connectivity problem.
        (
            SessionState::Authenticating,
            ErrorKind::UnexpectedEof | ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted,
        ) => ServerError::AuthenticationFailed,
        (SessionState::AwaitingReply, ErrorKind::UnexpectedEof) => {
            ServerError::Protocol("connection closed before reply".to_string())
        }
        _ => ServerError::Unreachable(err.to_string()),
    }
}
