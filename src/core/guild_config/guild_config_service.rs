use super::guild_config_models::{
    ConfigUpdate, ConnectionDefaults, GuildConfigDocument, GuildConfigRecord,
    GuildConnectionProfile,
};
use crate::core::persistence::{DocumentStore, StoreError};
use tokio::sync::RwLock;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Invalid value: {0}")]
    Invalid(String),
}

/// Resolves and mutates per-guild connection settings.
///
/// The in-memory document is the source of truth between writes. Mutations
/// are staged on a copy, persisted, and only then swapped in, so a failed
/// write never leaves a half-applied update behind. The write lock is held for
/// the whole read-modify-write-persist sequence.
pub struct GuildConfigService<S: DocumentStore<GuildConfigDocument>> {
    store: S,
    defaults: ConnectionDefaults,
    document: RwLock<GuildConfigDocument>,
}

impl<S: DocumentStore<GuildConfigDocument>> GuildConfigService<S> {
    /// Load the persisted document once; it stays in memory for the process lifetime.
    pub async fn new(store: S, defaults: ConnectionDefaults) -> Result<Self, ConfigError> {
        let document = store.load().await?;
        tracing::info!(guilds = document.len(), "Loaded guild configurations");

        Ok(Self {
            store,
            defaults,
            document: RwLock::new(document),
        })
    }

    pub fn defaults(&self) -> &ConnectionDefaults {
        &self.defaults
    }

    /// Effective profile for a guild. A guild with no record gets the defaults.
    pub async fn resolve(&self, guild_id: u64) -> GuildConnectionProfile {
        let document = self.document.read().await;
        match document.get(&guild_id) {
            Some(record) => record.resolve(&self.defaults),
            None => GuildConfigRecord::default().resolve(&self.defaults),
        }
    }

    pub async fn record(&self, guild_id: u64) -> Option<GuildConfigRecord> {
        self.document.read().await.get(&guild_id).cloned()
    }

    pub async fn prefix_for(&self, guild_id: u64) -> String {
        self.document
            .read()
            .await
            .get(&guild_id)
            .and_then(|r| r.prefix.clone())
            .unwrap_or_else(|| self.defaults.prefix.clone())
    }

    /// The one prefix that triggers commands in `guild_id` (DMs use the default).
    /// A guild override replaces the default rather than adding to it.
    pub async fn command_prefix(&self, guild_id: Option<u64>) -> String {
        match guild_id {
            Some(guild_id) => self.prefix_for(guild_id).await,
            None => self.defaults.prefix.clone(),
        }
    }

    #[allow(dead_code)] // commands batch fields through apply_update
    pub async fn set_host(&self, guild_id: u64, host: &str) -> Result<(), ConfigError> {
        self.apply_update(
            guild_id,
            ConfigUpdate {
                host: Some(host.to_string()),
                ..Default::default()
            },
        )
        .await
        .map(|_| ())
    }

    #[allow(dead_code)] // commands batch fields through apply_update
    pub async fn set_port(&self, guild_id: u64, port: u16) -> Result<(), ConfigError> {
        self.apply_update(
            guild_id,
            ConfigUpdate {
                port: Some(port),
                ..Default::default()
            },
        )
        .await
        .map(|_| ())
    }

    #[allow(dead_code)] // commands batch fields through apply_update
    pub async fn set_password(&self, guild_id: u64, password: &str) -> Result<(), ConfigError> {
        self.apply_update(
            guild_id,
            ConfigUpdate {
                password: Some(password.to_string()),
                ..Default::default()
            },
        )
        .await
        .map(|_| ())
    }

    pub async fn set_prefix(&self, guild_id: u64, prefix: &str) -> Result<(), ConfigError> {
        self.apply_update(
            guild_id,
            ConfigUpdate {
                prefix: Some(prefix.to_string()),
                ..Default::default()
            },
        )
        .await
        .map(|_| ())
    }

    /// Apply every field of `update` to the guild's record in one persist.
    pub async fn apply_update(
        &self,
        guild_id: u64,
        update: ConfigUpdate,
    ) -> Result<GuildConfigRecord, ConfigError> {
        validate(&update)?;

        let mut document = self.document.write().await;
        let mut staged = document.clone();
        let record = staged.entry(guild_id).or_default();
        update.apply_to(record);
        let updated = record.clone();

        self.store.save(&staged).await?;
        *document = staged;

        tracing::info!(guild_id, fields = ?update.describe(), "Guild config updated");
        Ok(updated)
    }
}

fn validate(update: &ConfigUpdate) -> Result<(), ConfigError> {
    if update.is_empty() {
        return Err(ConfigError::Invalid("nothing to update".to_string()));
    }
    if matches!(update.host.as_deref(), Some(h) if h.trim().is_empty()) {
        return Err(ConfigError::Invalid("host must not be empty".to_string()));
    }
    if update.port == Some(0) {
        return Err(ConfigError::Invalid("port must be between 1 and 65535".to_string()));
    }
    if let Some(prefix) = update.prefix.as_deref() {
        if prefix.is_empty() || prefix.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid(
                "prefix must be non-empty and contain no spaces".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        saved: Mutex<Option<GuildConfigDocument>>,
        initial: GuildConfigDocument,
        fail_writes: AtomicBool,
        writes: AtomicUsize,
    }

    #[async_trait]
    impl DocumentStore<GuildConfigDocument> for MemoryStore {
        async fn load(&self) -> Result<GuildConfigDocument, StoreError> {
            Ok(self.initial.clone())
        }

        async fn save(&self, document: &GuildConfigDocument) -> Result<(), StoreError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StoreError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only",
                )));
            }
            self.writes.fetch_add(1, Ordering::SeqCst);
            *self.saved.lock().unwrap() = Some(document.clone());
            Ok(())
        }
    }

    fn defaults() -> ConnectionDefaults {
        ConnectionDefaults {
            host: "play.default.net".into(),
            port: 25565,
            rcon_password: String::new(),
            prefix: "!".into(),
        }
    }

    async fn service() -> GuildConfigService<MemoryStore> {
        GuildConfigService::new(MemoryStore::default(), defaults())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn unknown_guild_resolves_to_defaults() {
        let service = service().await;

        for guild_id in [1u64, 42, u64::MAX] {
            let profile = service.resolve(guild_id).await;
            assert_eq!(
                profile,
                GuildConnectionProfile {
                    host: "play.default.net".into(),
                    port: 25565,
                    rcon_password: String::new(),
                }
            );
        }
    }

    #[tokio::test]
    async fn partial_record_keeps_other_defaults() {
        let service = service().await;
        service.set_host(7, "mc.example.net").await.unwrap();

        let profile = service.resolve(7).await;
        assert_eq!(profile.host, "mc.example.net");
        assert_eq!(profile.port, 25565);
        assert_eq!(profile.rcon_password, "");
    }

    #[tokio::test]
    async fn host_and_port_update_leaves_rcon_unset() {
        let service = service().await;
        service
            .apply_update(
                1,
                ConfigUpdate {
                    host: Some("mc.example.net".into()),
                    port: Some(25566),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let profile = service.resolve(1).await;
        assert_eq!(profile.address(), "mc.example.net:25566");
        assert!(!profile.has_rcon());
    }

    #[tokio::test]
    async fn setting_same_value_twice_is_idempotent() {
        let store = MemoryStore::default();
        let service = GuildConfigService::new(store, defaults()).await.unwrap();

        service.set_port(3, 25570).await.unwrap();
        let first = service.store.saved.lock().unwrap().clone();
        service.set_port(3, 25570).await.unwrap();
        let second = service.store.saved.lock().unwrap().clone();

        assert_eq!(first, second);
        assert_eq!(service.store.writes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_persist_does_not_touch_memory() {
        let service = service().await;
        service.set_host(9, "old.example.net").await.unwrap();

        service.store.fail_writes.store(true, Ordering::SeqCst);
        let result = service
            .apply_update(
                9,
                ConfigUpdate {
                    host: Some("new.example.net".into()),
                    password: Some("secret".into()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(ConfigError::Store(_))));
        let profile = service.resolve(9).await;
        assert_eq!(profile.host, "old.example.net");
        assert_eq!(profile.rcon_password, "");
    }

    #[tokio::test]
    async fn prefix_defaults_and_overrides() {
        let service = service().await;
        assert_eq!(service.prefix_for(5).await, "!");

        service.set_prefix(5, "$").await.unwrap();
        assert_eq!(service.prefix_for(5).await, "$");
        assert_eq!(service.prefix_for(6).await, "!");
    }

    #[tokio::test]
    async fn prefix_override_replaces_default() {
        let service = service().await;
        service.set_prefix(5, "$").await.unwrap();

        assert_eq!(service.command_prefix(Some(5)).await, "$");
        assert_eq!(service.command_prefix(Some(6)).await, "!");
        assert_eq!(service.command_prefix(None).await, "!");
    }

    #[tokio::test]
    async fn invalid_values_are_rejected_before_persisting() {
        let service = service().await;

        assert!(matches!(
            service.set_port(1, 0).await,
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            service.set_prefix(1, "a b").await,
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            service.set_host(1, "  ").await,
            Err(ConfigError::Invalid(_))
        ));
        assert_eq!(service.store.writes.load(Ordering::SeqCst), 0);
        assert!(service.record(1).await.is_none());
    }

    #[tokio::test]
    async fn loads_existing_document() {
        let mut initial = GuildConfigDocument::new();
        initial.insert(
            11,
            GuildConfigRecord {
                password: Some("secret".into()),
                ..Default::default()
            },
        );
        let store = MemoryStore {
            initial,
            ..Default::default()
        };

        let service = GuildConfigService::new(store, defaults()).await.unwrap();
        let profile = service.resolve(11).await;
        assert_eq!(profile.host, "play.default.net");
        assert_eq!(profile.rcon_password, "secret");
    }
}
