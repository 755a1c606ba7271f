use crate::core::persistence::{DocumentStore, StoreError};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Pretty-printed JSON file holding one whole document.
///
/// A missing file loads as `D::default()`. A file that exists but can't be
/// parsed is an error, so a typo on disk never gets overwritten by an empty
/// document.
pub struct JsonDocumentStore<D> {
    path: PathBuf,
    _document: PhantomData<fn() -> D>,
}

impl<D> JsonDocumentStore<D> {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            _document: PhantomData,
        }
    }
}

#[async_trait]
impl<D> DocumentStore<D> for JsonDocumentStore<D>
where
    D: Serialize + DeserializeOwned + Default + Send + Sync + 'static,
{
    async fn load(&self) -> Result<D, StoreError> {
        let text = match fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "No document on disk yet, starting empty");
                return Ok(D::default());
            }
            Err(e) => return Err(e.into()),
        };

        if text.trim().is_empty() {
            return Ok(D::default());
        }

        Ok(serde_json::from_str(&text)?)
    }

    async fn save(&self, document: &D) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let text = serde_json::to_string_pretty(document)?;

        // Write beside the target and rename so a crash mid-write can't truncate it.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, text).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
