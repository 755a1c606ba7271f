use super::waypoint_models::{Coordinates, Waypoint, WaypointDocument};
use crate::core::persistence::{DocumentStore, StoreError};
use tokio::sync::RwLock;

#[derive(Debug, thiserror::Error)]
pub enum WaypointError {
    #[error("A waypoint named `{0}` already exists.")]
    AlreadyExists(String),
    #[error("No waypoint named `{0}`.")]
    NotFound(String),
    #[error("Only the creator or an admin may remove this.")]
    NotOwner,
    #[error("{0}")]
    Invalid(String),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Per-guild named locations. Same persistence policy as guild configs:
/// stage on a copy, persist, then swap.
pub struct WaypointService<S: DocumentStore<WaypointDocument>> {
    store: S,
    document: RwLock<WaypointDocument>,
}

impl<S: DocumentStore<WaypointDocument>> WaypointService<S> {
    pub async fn new(store: S) -> Result<Self, WaypointError> {
        let document = store.load().await?;
        tracing::info!(guilds = document.len(), "Loaded waypoints");

        Ok(Self {
            store,
            document: RwLock::new(document),
        })
    }

    pub async fn add(
        &self,
        guild_id: u64,
        name: &str,
        coords: Coordinates,
        added_by: u64,
    ) -> Result<(String, Waypoint), WaypointError> {
        let key = normalize(name)?;
        let waypoint = Waypoint {
            x: coords.x,
            y: coords.y,
            z: Some(coords.z),
            added_by,
            added_at: chrono::Local::now().format("%m/%d/%y").to_string(),
        };

        let mut document = self.document.write().await;
        if document
            .get(&guild_id)
            .is_some_and(|wps| wps.contains_key(&key))
        {
            return Err(WaypointError::AlreadyExists(key));
        }

        let mut staged = document.clone();
        staged
            .entry(guild_id)
            .or_default()
            .insert(key.clone(), waypoint.clone());
        self.store.save(&staged).await?;
        *document = staged;

        tracing::info!(guild_id, name = %key, added_by, "Waypoint added");
        Ok((key, waypoint))
    }

    /// Remove a waypoint. Only its creator or an administrator may do so.
    pub async fn remove(
        &self,
        guild_id: u64,
        name: &str,
        requester: u64,
        is_admin: bool,
    ) -> Result<String, WaypointError> {
        let key = normalize(name)?;

        let mut document = self.document.write().await;
        let existing = document
            .get(&guild_id)
            .and_then(|wps| wps.get(&key))
            .ok_or_else(|| WaypointError::NotFound(key.clone()))?;
        if existing.added_by != requester && !is_admin {
            return Err(WaypointError::NotOwner);
        }

        let mut staged = document.clone();
        if let Some(wps) = staged.get_mut(&guild_id) {
            wps.remove(&key);
        }
        self.store.save(&staged).await?;
        *document = staged;

        tracing::info!(guild_id, name = %key, requester, "Waypoint removed");
        Ok(key)
    }

    /// All waypoints for a guild, ordered by name.
    pub async fn list(&self, guild_id: u64) -> Vec<(String, Waypoint)> {
        self.document
            .read()
            .await
            .get(&guild_id)
            .map(|wps| wps.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    pub async fn info(&self, guild_id: u64, name: &str) -> Result<(String, Waypoint), WaypointError> {
        let key = normalize(name)?;
        self.document
            .read()
            .await
            .get(&guild_id)
            .and_then(|wps| wps.get(&key).cloned())
            .map(|wp| (key.clone(), wp))
            .ok_or(WaypointError::NotFound(key))
    }
}

fn normalize(name: &str) -> Result<String, WaypointError> {
    let key = name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    if key.is_empty() {
        return Err(WaypointError::Invalid("You must provide a name.".to_string()));
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        saved: Mutex<Option<WaypointDocument>>,
    }

    #[async_trait]
    impl DocumentStore<WaypointDocument> for MemoryStore {
        async fn load(&self) -> Result<WaypointDocument, StoreError> {
            Ok(WaypointDocument::new())
        }

        async fn save(&self, document: &WaypointDocument) -> Result<(), StoreError> {
            *self.saved.lock().unwrap() = Some(document.clone());
            Ok(())
        }
    }

    const GUILD: u64 = 100;
    const ALICE: u64 = 1;
    const BOB: u64 = 2;

    fn at(x: i64, z: i64) -> Coordinates {
        Coordinates { x, y: None, z }
    }

    async fn service() -> WaypointService<MemoryStore> {
        WaypointService::new(MemoryStore::default()).await.unwrap()
    }

    #[tokio::test]
    async fn names_are_case_insensitive() {
        let service = service().await;
        let (key, _) = service.add(GUILD, "Home Base", at(1, 2), ALICE).await.unwrap();
        assert_eq!(key, "home base");

        let err = service.add(GUILD, "HOME   base", at(3, 4), BOB).await.unwrap_err();
        assert!(matches!(err, WaypointError::AlreadyExists(name) if name == "home base"));

        let (_, wp) = service.info(GUILD, "home BASE").await.unwrap();
        assert_eq!((wp.x, wp.z), (1, Some(2)));
    }

    #[tokio::test]
    async fn waypoints_are_scoped_per_guild() {
        let service = service().await;
        service.add(GUILD, "spawn", at(0, 0), ALICE).await.unwrap();

        assert!(service.list(GUILD + 1).await.is_empty());
        assert!(service.add(GUILD + 1, "spawn", at(5, 5), ALICE).await.is_ok());
    }

    #[tokio::test]
    async fn only_owner_or_admin_can_remove() {
        let service = service().await;
        service.add(GUILD, "farm", at(10, 10), ALICE).await.unwrap();

        assert!(matches!(
            service.remove(GUILD, "farm", BOB, false).await,
            Err(WaypointError::NotOwner)
        ));
        assert_eq!(service.remove(GUILD, "farm", BOB, true).await.unwrap(), "farm");
        assert!(matches!(
            service.remove(GUILD, "farm", ALICE, false).await,
            Err(WaypointError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_is_sorted_and_persisted() {
        let service = service().await;
        service.add(GUILD, "zeta", at(1, 1), ALICE).await.unwrap();
        service.add(GUILD, "alpha", at(2, 2), ALICE).await.unwrap();

        let names: Vec<_> = service.list(GUILD).await.into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);

        let saved = service.store.saved.lock().unwrap().clone().unwrap();
        assert_eq!(saved[&GUILD].len(), 2);
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let service = service().await;
        assert!(matches!(
            service.add(GUILD, "   ", at(0, 0), ALICE).await,
            Err(WaypointError::Invalid(_))
        ));
    }
}
