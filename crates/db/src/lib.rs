//! Database module for SideQuests
//!
//! Provides SurrealDB connection management with an embedded SurrealKV
//! backend, schema initialization, and ranked quest/objective storage.

pub mod error;
pub mod id;
pub mod models;
pub mod rank;
pub mod repository;
pub mod schema;

pub use error::{DbError, DbResult};
pub use models::{Entity, Objective, Quest, Scope, default_quest_name};
pub use rank::{RankAssignment, Ranked};
pub use repository::{ObjectiveRepository, QuestRepository, RankManager, SiblingRepository};

use std::path::{Path, PathBuf};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, SurrealKv};
use tracing::debug;

/// Default database path, relative to the working directory of the service
pub const DEFAULT_DB_PATH: &str = ".sidequests/data";

/// Database wrapper providing connection management for SurrealDB
pub struct Database {
    /// The underlying SurrealDB client
    client: Surreal<Db>,
    /// Path where the database is stored
    path: PathBuf,
}

impl Database {
    /// Connect to a SurrealDB database at the specified path.
    ///
    /// Creates the database directory if it doesn't exist.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the database directory
    ///
    /// # Errors
    ///
    /// Returns `DbError::CreateDirectory` if directory creation fails.
    /// Returns `DbError::Connection` if database connection fails.
    pub async fn connect(path: &Path) -> DbResult<Self> {
        let path = Self::prepare_path(path)?;

        debug!("Opening database at {}", path.display());
        let client = Surreal::new::<SurrealKv>(path.clone())
            .await
            .map_err(|e| DbError::Connection {
                path: path.clone(),
                source: Box::new(e),
            })?;

        Ok(Self { client, path })
    }

    /// Initialize the database schema.
    ///
    /// Selects the SideQuests namespace and database, then defines the
    /// quest and objective tables.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Schema` if schema initialization fails.
    pub async fn init(&self) -> DbResult<()> {
        self.client
            .use_ns("sidequests")
            .use_db("main")
            .await
            .map_err(|e| DbError::Schema(Box::new(e)))?;

        schema::init_schema(&self.client).await?;

        Ok(())
    }

    /// Get a reference to the underlying SurrealDB client.
    pub fn client(&self) -> &Surreal<Db> {
        &self.client
    }

    /// Get the path where the database is stored.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Quest repository bound to this database
    pub fn quests(&self) -> QuestRepository<'_> {
        QuestRepository::new(&self.client)
    }

    /// Objective repository bound to this database
    pub fn objectives(&self) -> ObjectiveRepository<'_> {
        ObjectiveRepository::new(&self.client)
    }

    /// Get the default database path, `.sidequests/data` under the current
    /// working directory.
    pub fn default_path() -> PathBuf {
        PathBuf::from(DEFAULT_DB_PATH)
    }

    /// Prepare the database path by creating missing directories.
    fn prepare_path(path: &Path) -> DbResult<PathBuf> {
        let path = path.to_path_buf();

        if !path.exists() {
            std::fs::create_dir_all(&path).map_err(|e| DbError::CreateDirectory {
                path: path.clone(),
                source: e,
            })?;
        }

        Ok(path)
    }
}

static_assertions::assert_impl_all!(Database: Send, Sync);
