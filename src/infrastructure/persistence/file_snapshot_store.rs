use crate::application::ports::SnapshotStore;
use crate::domain::value_objects::CacheNamespace;
use crate::shared::config::PersistenceConfig;
use crate::shared::error::PersistenceError;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;

/// One JSON file per namespace under a data directory. Writes land in a
/// sibling temp file first and are renamed into place, so a crash mid-save
/// leaves the previous blob intact.
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(config: &PersistenceConfig) -> Self {
        match &config.data_dir {
            Some(dir) => Self::new(dir),
            None => Self::new(default_data_dir()),
        }
    }

    fn blob_path(&self, namespace: &CacheNamespace) -> PathBuf {
        self.dir.join(format!("{}.json", namespace.as_str()))
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("kagami"))
        .unwrap_or_else(|| PathBuf::from("./data/kagami"))
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn load(&self, namespace: &CacheNamespace) -> Result<Option<String>, PersistenceError> {
        match tokio::fs::read_to_string(self.blob_path(namespace)).await {
            Ok(blob) => Ok(Some(blob)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, namespace: &CacheNamespace, blob: String) -> Result<(), PersistenceError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.blob_path(namespace);
        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, blob.as_bytes()).await?;
        tokio::fs::rename(&staging, &path).await?;
        Ok(())
    }
}
