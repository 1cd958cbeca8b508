//! Database schema initialization for SideQuests
//!
//! Defines the SurrealDB tables for quests and their objectives. Objectives
//! reference their quest through a plain `quest_id` key, not a record link.

use crate::error::DbError;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// SQL statements for schema initialization
mod sql {
    /// Define the quest table with all fields
    pub const DEFINE_QUEST_TABLE: &str = r#"
        DEFINE TABLE IF NOT EXISTS quest SCHEMAFULL;

        DEFINE FIELD IF NOT EXISTS name ON quest TYPE string
            ASSERT string::len(string::trim($value)) > 0;

        DEFINE FIELD IF NOT EXISTS rank ON quest TYPE int DEFAULT 0;

        DEFINE FIELD IF NOT EXISTS created_at ON quest TYPE datetime DEFAULT time::now();

        DEFINE FIELD IF NOT EXISTS last_objective_at ON quest TYPE datetime DEFAULT time::now();
    "#;

    /// Define the objective table with all fields
    pub const DEFINE_OBJECTIVE_TABLE: &str = r#"
        DEFINE TABLE IF NOT EXISTS objective SCHEMAFULL;

        DEFINE FIELD IF NOT EXISTS title ON objective TYPE string
            ASSERT string::len(string::trim($value)) > 0;

        DEFINE FIELD IF NOT EXISTS completed ON objective TYPE bool DEFAULT false;

        DEFINE FIELD IF NOT EXISTS rank ON objective TYPE int DEFAULT 0;

        DEFINE FIELD IF NOT EXISTS quest_id ON objective TYPE string;

        DEFINE FIELD IF NOT EXISTS created_at ON objective TYPE datetime DEFAULT time::now();

        DEFINE INDEX IF NOT EXISTS objective_quest ON objective FIELDS quest_id;
    "#;
}

/// Initialize the database schema.
///
/// Creates the quest and objective tables with their fields and the
/// `quest_id` lookup index.
///
/// This function is idempotent - it can be called multiple times safely
/// as it uses `IF NOT EXISTS` clauses.
///
/// # Errors
///
/// Returns `DbError::Schema` if any schema definition fails.
pub async fn init_schema(client: &Surreal<Db>) -> Result<(), DbError> {
    for statement in [sql::DEFINE_QUEST_TABLE, sql::DEFINE_OBJECTIVE_TABLE] {
        client
            .query(statement)
            .await
            .map_err(|e| DbError::Schema(Box::new(e)))?
            .check()
            .map_err(|e| DbError::Schema(Box::new(e)))?;
    }

    Ok(())
}
