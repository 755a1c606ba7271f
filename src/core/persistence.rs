use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Whole-document persistence.
///
/// Stores never merge: `load` returns the full snapshot (an empty document when
/// nothing has been written yet) and `save` replaces it.
#[async_trait]
pub trait DocumentStore<D: Send + Sync>: Send + Sync {
    async fn load(&self) -> Result<D, StoreError>;
    async fn save(&self, document: &D) -> Result<(), StoreError>;
}
