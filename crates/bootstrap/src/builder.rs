//! Assembles the store stack and opens the [`Huddle`] handle.
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use huddle_core::{Clock, SystemClock};
use huddle_runtime::{
    FileRecordStore, Huddle, InMemoryRecordStore, MigrationRunner, RecordStore, SyncedStore,
};

use crate::config::{HuddleConfig, StoreKind};

/// Builder that turns a [`HuddleConfig`] into an open [`Huddle`].
pub struct HuddleBuilder {
    config: HuddleConfig,
    clock: Arc<dyn Clock>,
    migrations: MigrationRunner,
}

impl HuddleBuilder {
    pub fn new(config: HuddleConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
            migrations: MigrationRunner::standard(),
        }
    }

    /// Provide a custom clock (e.g., a fixed clock in tests).
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn migrations(mut self, migrations: MigrationRunner) -> Self {
        self.migrations = migrations;
        self
    }

    pub fn config(&self) -> &HuddleConfig {
        &self.config
    }

    /// Open the configured store, wrap it for sync when a remote is set,
    /// and run migrations.
    pub fn build(self) -> Result<Huddle> {
        let local: Arc<dyn RecordStore> = match self.config.store {
            StoreKind::Memory => Arc::new(InMemoryRecordStore::new()),
            StoreKind::File => Arc::new(open_file_store(&self.config.data_dir)?),
        };

        let store: Arc<dyn RecordStore> = match &self.config.remote_dir {
            Some(remote_dir) => {
                let remote = Arc::new(open_file_store(remote_dir)?);
                tracing::info!("Mirroring records to {}", remote_dir.display());
                Arc::new(
                    SyncedStore::new(local, remote)
                        .context("failed to read the sync journal")?,
                )
            }
            None => local,
        };

        tracing::info!(
            "Opening huddle ({} store at {})",
            self.config.store,
            self.config.data_dir.display()
        );
        let huddle = Huddle::with_migrations(store, self.clock, &self.migrations);

        for (name, reason) in huddle.migration_report().failures() {
            tracing::warn!("Migration '{}' will be retried: {}", name, reason);
        }

        Ok(huddle)
    }
}

fn open_file_store(dir: &Path) -> Result<FileRecordStore> {
    FileRecordStore::open(dir)
        .with_context(|| format!("failed to open record store at {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_core::{NewUser, Role};
    use tempfile::TempDir;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_owned(),
            email: format!("{username}@example.com"),
            password: "secret".to_owned(),
            role: Role::Coach,
        }
    }

    #[test]
    fn memory_store_needs_no_directory() {
        let huddle = HuddleBuilder::new(HuddleConfig::in_memory()).build().unwrap();
        assert!(huddle.migration_report().is_clean());
        huddle.users().create_user(new_user("coach")).unwrap();
        assert_eq!(huddle.users().list_users().unwrap().len(), 1);
    }

    #[test]
    fn file_store_writes_under_data_dir() {
        let dir = TempDir::new().unwrap();
        let config = HuddleConfig {
            data_dir: dir.path().join("data"),
            ..HuddleConfig::default()
        };

        let huddle = HuddleBuilder::new(config).build().unwrap();
        huddle.users().create_user(new_user("coach")).unwrap();
        assert!(dir.path().join("data/users.json").exists());
    }

    #[test]
    fn remote_dir_mirrors_writes() {
        let dir = TempDir::new().unwrap();
        let config = HuddleConfig {
            data_dir: dir.path().join("local"),
            remote_dir: Some(dir.path().join("remote")),
            ..HuddleConfig::default()
        };

        let huddle = HuddleBuilder::new(config).build().unwrap();
        huddle.users().create_user(new_user("coach")).unwrap();

        let remote = FileRecordStore::open(dir.path().join("remote")).unwrap();
        let users = remote.get("users").unwrap().unwrap();
        assert_eq!(users[0]["username"], "coach");
    }

    #[test]
    fn unusable_data_dir_is_an_error() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("occupied");
        std::fs::write(&file, "not a directory").unwrap();

        let config = HuddleConfig {
            data_dir: file,
            ..HuddleConfig::default()
        };
        assert!(HuddleBuilder::new(config).build().is_err());
    }
}
