use thiserror::Error;

/// Failure kinds surfaced by the status and remote-console paths.
///
/// Transport errors never leave the protocol clients raw; they are always folded
/// into one of these so the Discord layer can branch on the kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServerError {
    #[error("RCON is not configured for this guild")]
    NotConfigured,
    #[error("Server unreachable: {0}")]
    Unreachable(String),
    #[error("RCON authentication failed")]
    AuthenticationFailed,
    #[error("Unexpected reply from server: {0}")]
    Protocol(String),
    #[error("Invalid input: {0}")]
    Validation(String),
}

impl ServerError {
    /// Stable, user-facing text for each failure category.
    pub fn user_message(&self) -> String {
        match self {
            ServerError::NotConfigured => "🔒 RCON isn't set up for this server. \
                An admin can add a password with `config <ip> [port] [password]`."
                .to_string(),
            ServerError::Unreachable(_) => "⚠️ Server appears offline or unreachable.".to_string(),
            ServerError::AuthenticationFailed => "🚫 The server rejected the RCON password. \
                Ask an admin to check the password and that `enable-rcon=true` is set."
                .to_string(),
            ServerError::Protocol(_) => {
                "⚠️ The server sent a reply the bot couldn't understand.".to_string()
            }
            ServerError::Validation(reason) => format!("❌ {}", reason),
        }
    }

    #[cfg(test)]
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ServerError::Unreachable(_))
    }
}
