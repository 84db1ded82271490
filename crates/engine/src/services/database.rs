use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tokio::sync::RwLock;

use super::fault;
use crate::{DatabaseConfig, EngineError, KakeboStore, Platform, ResultEngine};

const DATABASE_FILE: &str = "kakebo.db";
const DATABASE_EXTENSIONS: &[&str] = &["db"];

/// Connection lifecycle: which database file is open and with what settings.
#[derive(Debug)]
pub struct DatabaseService {
    store: Arc<KakeboStore>,
    current: RwLock<Option<DatabaseConfig>>,
}

impl DatabaseService {
    pub fn new(store: Arc<KakeboStore>) -> Self {
        Self {
            store,
            current: RwLock::new(None),
        }
    }

    pub async fn connect(&self, config: DatabaseConfig) -> ResultEngine<()> {
        let result = self.store.connect(&config).await;
        let mut current = self.current.write().await;
        match result {
            Ok(()) => {
                *current = Some(config);
                Ok(())
            }
            Err(err) => {
                *current = None;
                fault("connect", Err(err))
            }
        }
    }

    pub async fn disconnect(&self) {
        self.store.disconnect().await;
        *self.current.write().await = None;
    }

    pub async fn is_connected(&self) -> bool {
        self.current.read().await.is_some() && self.store.is_connected().await
    }

    pub async fn current_config(&self) -> Option<DatabaseConfig> {
        self.current.read().await.clone()
    }

    /// Opens `config` and runs the smoke check, returning the transaction
    /// count. The previously active database is reopened afterwards; with
    /// none active the store is left disconnected.
    pub async fn test_connection(&self, config: &DatabaseConfig) -> ResultEngine<u64> {
        let previous = self.current.read().await.clone();

        let outcome = match self.store.connect(config).await {
            Ok(()) => self.store.test_connection().await,
            Err(err) => Err(err),
        };

        match previous {
            Some(prev) if prev != *config => {
                if let Err(err) = self.store.connect(&prev).await {
                    tracing::warn!("could not reopen {}: {err}", prev.path.display());
                    *self.current.write().await = None;
                }
            }
            Some(_) => {
                if outcome.is_err() {
                    *self.current.write().await = None;
                }
            }
            None => self.store.disconnect().await,
        }

        fault("test_connection", outcome)
    }

    /// Creates missing parent directories, then connects; connecting creates
    /// the file and its schema.
    pub async fn create_database(
        &self,
        path: impl AsRef<Path>,
        password: Option<String>,
    ) -> ResultEngine<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|err| {
                EngineError::Io(format!("cannot create {}: {err}", parent.display()))
            })?;
        }
        tracing::info!("creating database at {}", path.display());
        self.connect(DatabaseConfig::new(path).with_password(password))
            .await
    }

    /// `<platform data dir>/kakebo.db`.
    pub fn default_database_path(platform: &impl Platform) -> PathBuf {
        platform.local_data_path().join(DATABASE_FILE)
    }

    /// Asks the platform for an existing file and opens it. `Ok(false)` when
    /// the user cancelled.
    pub async fn open_with_picker(
        &self,
        platform: &impl Platform,
        password: Option<String>,
        read_only: bool,
    ) -> ResultEngine<bool> {
        let Some(path) = platform
            .pick_file("Open Kakebo database", DATABASE_EXTENSIONS)
            .await
        else {
            return Ok(false);
        };
        let config = DatabaseConfig::new(path)
            .with_password(password)
            .read_only(read_only);
        self.connect(config).await?;
        Ok(true)
    }

    /// Asks the platform where to save a new database and creates it.
    /// `Ok(false)` when the user cancelled.
    pub async fn create_with_picker(
        &self,
        platform: &impl Platform,
        password: Option<String>,
    ) -> ResultEngine<bool> {
        let Some(path) = platform
            .save_file("New Kakebo database", DATABASE_FILE, DATABASE_EXTENSIONS)
            .await
        else {
            return Ok(false);
        };
        self.create_database(path, password).await?;
        Ok(true)
    }
}
