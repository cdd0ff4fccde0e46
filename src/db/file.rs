use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::db::backend::{CollectionBackend, StoreError};

const EMPTY_COLLECTION: &[u8] = b"[]";

/// A JSON array in a single file, rewritten in full on every persist.
#[derive(Debug)]
pub(crate) struct JsonFileBackend<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFileBackend<T> {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), _marker: PhantomData }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_initialized(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|err| StoreError::io(parent, err))?;
        }

        match fs::OpenOptions::new().write(true).create_new(true).open(&self.path).await {
            Ok(mut file) => {
                file.write_all(EMPTY_COLLECTION)
                    .await
                    .map_err(|err| StoreError::io(&self.path, err))?;
                tracing::info!(path = %self.path.display(), "Initialised empty collection file");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => Ok(()),
            Err(err) => Err(StoreError::io(&self.path, err)),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|name| name.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl<T> CollectionBackend<T> for JsonFileBackend<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn load(&self) -> Result<Vec<T>, StoreError> {
        self.ensure_initialized().await?;

        let raw = fs::read_to_string(&self.path)
            .await
            .map_err(|err| StoreError::io(&self.path, err))?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&raw)
            .map_err(|source| StoreError::Corrupt { path: self.path.clone(), source })
    }

    async fn persist(&self, items: &[T]) -> Result<(), StoreError> {
        self.ensure_initialized().await?;

        let encoded = serde_json::to_vec_pretty(items).map_err(StoreError::Encode)?;
        let temp_path = self.temp_path();

        fs::write(&temp_path, &encoded).await.map_err(|err| StoreError::io(&temp_path, err))?;
        fs::rename(&temp_path, &self.path).await.map_err(|err| StoreError::io(&self.path, err))?;

        tracing::debug!(path = %self.path.display(), items = items.len(), "Persisted collection");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("json file {}", self.path.display())
    }
}
