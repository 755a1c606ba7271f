use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const DEFAULT_HOST: &str = "mc.hypixel.net";
pub const DEFAULT_PORT: u16 = 25565;
pub const DEFAULT_PREFIX: &str = "!";

/// Per-guild overrides as they sit on disk. Every field is optional; anything
/// missing (or `null`) falls back to [`ConnectionDefaults`].
///
/// Reading is lenient: a field with an unusable value (a port outside
/// 1..=65535, an object where text belongs) is dropped with a warning so one
/// bad record never keeps the other guilds from loading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value")]
pub struct GuildConfigRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

impl From<Value> for GuildConfigRecord {
    fn from(value: Value) -> Self {
        let Value::Object(fields) = value else {
            if !value.is_null() {
                tracing::warn!(record = %value, "Ignoring guild config record that is not an object");
            }
            return Self::default();
        };

        Self {
            ip: text_field(&fields, "ip"),
            port: port_field(&fields),
            password: text_field(&fields, "password"),
            prefix: text_field(&fields, "prefix"),
        }
    }
}

fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        // Older documents stored numeric passwords unquoted.
        Value::Number(number) => Some(number.to_string()),
        other => {
            tracing::warn!(field = key, value = %other, "Dropping unreadable guild config field");
            None
        }
    }
}

fn port_field(fields: &Map<String, Value>) -> Option<u16> {
    let raw = fields.get("port")?;
    let port = match raw {
        Value::Null => return None,
        Value::Number(number) => number.as_u64().and_then(|p| u16::try_from(p).ok()),
        Value::String(text) => text.trim().parse::<u16>().ok(),
        _ => None,
    };
    match port {
        Some(port) if port > 0 => Some(port),
        _ => {
            tracing::warn!(value = %raw, "Dropping out-of-range port from guild config");
            None
        }
    }
}

/// The full persisted document: `{ guild_id: record }`.
pub type GuildConfigDocument = BTreeMap<u64, GuildConfigRecord>;

/// Process-wide fallbacks, declared once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDefaults {
    pub host: String,
    pub port: u16,
    pub rcon_password: String,
    pub prefix: String,
}

impl Default for ConnectionDefaults {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            rcon_password: String::new(),
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

/// Effective endpoint for a guild after overlaying its record on the defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildConnectionProfile {
    pub host: String,
    pub port: u16,
    pub rcon_password: String,
}

impl GuildConnectionProfile {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn has_rcon(&self) -> bool {
        !self.rcon_password.is_empty()
    }
}

impl GuildConfigRecord {
    /// Merge this record over `defaults`, field by field.
    pub fn resolve(&self, defaults: &ConnectionDefaults) -> GuildConnectionProfile {
        GuildConnectionProfile {
            host: self.ip.clone().unwrap_or_else(|| defaults.host.clone()),
            port: self.port.unwrap_or(defaults.port),
            rcon_password: self
                .password
                .clone()
                .unwrap_or_else(|| defaults.rcon_password.clone()),
        }
    }
}

/// A batch of field changes applied to one record in a single persist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigUpdate {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub password: Option<String>,
    pub prefix: Option<String>,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        self.host.is_none() && self.port.is_none() && self.password.is_none() && self.prefix.is_none()
    }

    pub fn apply_to(&self, record: &mut GuildConfigRecord) {
        if let Some(host) = &self.host {
            record.ip = Some(host.clone());
        }
        if let Some(port) = self.port {
            record.port = Some(port);
        }
        if let Some(password) = &self.password {
            record.password = Some(password.clone());
        }
        if let Some(prefix) = &self.prefix {
            record.prefix = Some(prefix.clone());
        }
    }

    /// Human-readable summary, password masked.
    pub fn describe(&self) -> Vec<String> {
        let mut parts = Vec::new();
        if let Some(host) = &self.host {
            parts.push(format!("ip={}", host));
        }
        if let Some(port) = self.port {
            parts.push(format!("port={}", port));
        }
        if self.password.is_some() {
            parts.push("password=******".to_string());
        }
        if let Some(prefix) = &self.prefix {
            parts.push(format!("prefix={}", prefix));
        }
        parts
    }
}
