//! Generic ranked sibling collection
//!
//! CRUD over the records of one table, partitioned into scopes and kept in
//! rank order. The quest and objective repositories are thin wrappers that
//! add their entity-specific rules on top.

use serde::Serialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tracing::{debug, trace};

use super::RankManager;
use crate::error::{DbError, DbResult};
use crate::id::{IdGenerator, MAX_ATTEMPTS};
use crate::models::{Entity, Quest, Scope};
use crate::rank;

/// Statement creating `$id` with `$content` in `table`.
///
/// Owned scopes guard the insert with an existence check on the owning
/// quest and touch that quest in the same transaction.
fn insert_query(table: &str, scope: &Scope) -> String {
    match scope {
        Scope::Quests => format!("CREATE type::thing('{table}', $id) CONTENT $content"),
        Scope::Quest(_) => format!(
            r#"BEGIN TRANSACTION;
            IF (SELECT VALUE id FROM type::thing('{owner}', $owner)) == [] {{
                THROW "Owner " + $owner + " does not exist";
            }};
            UPDATE type::thing('{owner}', $owner) SET last_objective_at = time::now();
            CREATE type::thing('{table}', $id) CONTENT $content;
            COMMIT TRANSACTION;"#,
            owner = Quest::TABLE,
        ),
    }
}

/// Repository for one table of ranked records
pub struct SiblingRepository<'a, T: Entity> {
    client: &'a Surreal<Db>,
    ranks: RankManager<'a>,
    _entity: std::marker::PhantomData<T>,
}

impl<'a, T: Entity> SiblingRepository<'a, T> {
    /// Create a new SiblingRepository with the given database client
    pub fn new(client: &'a Surreal<Db>) -> Self {
        Self {
            client,
            ranks: RankManager::new(client),
            _entity: std::marker::PhantomData,
        }
    }

    /// Check if a record with the given id exists.
    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        Ok(self.get(id).await?.is_some())
    }

    /// Get a record by id.
    ///
    /// # Returns
    ///
    /// `Some(T)` if found, `None` otherwise.
    pub async fn get(&self, id: &str) -> DbResult<Option<T>> {
        debug!("Fetching {}: {}", T::TABLE, id);
        let row: Option<T::Row> = self
            .client
            .select((T::TABLE, id))
            .await
            .map_err(|e| DbError::Query(Box::new(e)))?;
        Ok(row.map(T::from_row))
    }

    /// Fetch a record that must exist and belong to `scope`.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if no record has this id.
    /// Returns `DbError::ScopeMismatch` if the record belongs to another quest.
    pub async fn find_in_scope(&self, scope: &Scope, id: &str) -> DbResult<T> {
        let record = self.get(id).await?.ok_or_else(|| DbError::NotFound {
            kind: T::KIND,
            id: id.to_string(),
        })?;

        if record.owner() != scope.owner() {
            debug!(
                "{} {} requested under {} but belongs to {:?}",
                T::TABLE,
                id,
                scope,
                record.owner()
            );
            return Err(DbError::ScopeMismatch {
                kind: T::KIND,
                id: id.to_string(),
                scope: scope.owner().unwrap_or_default().to_string(),
            });
        }

        Ok(record)
    }

    /// All records in `scope`, sorted by rank.
    ///
    /// Rank ties are broken by creation time, then by id, so repeated calls
    /// return the same order.
    pub async fn list(&self, scope: &Scope) -> DbResult<Vec<T>> {
        let query = match scope {
            Scope::Quests => format!("SELECT * FROM {}", T::TABLE),
            Scope::Quest(_) => format!("SELECT * FROM {} WHERE quest_id = $owner", T::TABLE),
        };
        let mut request = self.client.query(&query);
        if let Some(owner) = scope.owner() {
            request = request.bind(("owner", owner.to_string()));
        }
        let mut result = request.await?;
        let rows: Vec<T::Row> = result.take(0)?;

        let mut records: Vec<T> = rows.into_iter().map(T::from_row).collect();
        rank::sort_siblings(&mut records);
        trace!("Listed {} {} records in {}", records.len(), T::TABLE, scope);
        Ok(records)
    }

    /// Insert a new record at the end of `scope`.
    ///
    /// `content` receives the assigned rank and returns the field values to
    /// store. The id is generated from `seed`.
    ///
    /// For a quest scope the insert runs in one transaction that fails when
    /// the owning quest is gone and writes the quest record. A concurrent
    /// quest delete therefore conflicts with the insert instead of leaving
    /// an orphan behind.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Transaction` if the owner is missing or a
    /// concurrent write conflicts; nothing is created.
    pub async fn insert<C, F>(&self, scope: &Scope, seed: &str, content: F) -> DbResult<T>
    where
        C: Serialize + 'static,
        F: FnOnce(i64) -> C,
    {
        let rank = self.ranks.next_rank(T::TABLE, scope).await?;
        let id = self.generate_unique_id(seed).await?;
        debug!("Creating {}: {} at rank {} in {}", T::TABLE, id, rank, scope);

        let mut request = self
            .client
            .query(insert_query(T::TABLE, scope))
            .bind(("id", id.clone()))
            .bind(("content", content(rank)));
        if let Some(owner) = scope.owner() {
            request = request.bind(("owner", owner.to_string()));
        }

        let response = request.await?;
        match scope {
            Scope::Quests => {
                response.check()?;
            }
            Scope::Quest(_) => {
                response.check().map_err(|e| {
                    debug!("Insert into {} rolled back: {}", scope, e);
                    DbError::Transaction(Box::new(e))
                })?;
            }
        }

        self.get(&id)
            .await?
            .ok_or(DbError::NotFound { kind: T::KIND, id })
    }

    /// Set the display text field of a record in `scope`.
    ///
    /// The text is trimmed before storing.
    ///
    /// # Errors
    ///
    /// Returns `DbError::ValidationError` if the trimmed text is empty.
    /// Returns `DbError::NotFound` / `DbError::ScopeMismatch` per
    /// [`Self::find_in_scope`].
    pub async fn rename(&self, scope: &Scope, id: &str, text: &str) -> DbResult<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DbError::validation(format!(
                "{} {} cannot be empty.",
                T::KIND,
                T::TEXT_FIELD
            )));
        }

        self.find_in_scope(scope, id).await?;

        debug!("Renaming {}: {}", T::TABLE, id);
        let query = format!(
            "UPDATE type::thing('{}', $id) SET {} = $text",
            T::TABLE,
            T::TEXT_FIELD
        );
        self.client
            .query(&query)
            .bind(("id", id.to_string()))
            .bind(("text", text.to_string()))
            .await?
            .check()?;
        Ok(())
    }

    /// Delete a single record in `scope`.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` / `DbError::ScopeMismatch` per
    /// [`Self::find_in_scope`].
    pub async fn delete(&self, scope: &Scope, id: &str) -> DbResult<()> {
        self.find_in_scope(scope, id).await?;

        debug!("Deleting {}: {}", T::TABLE, id);
        let query = format!("DELETE type::thing('{}', $id)", T::TABLE);
        self.client
            .query(&query)
            .bind(("id", id.to_string()))
            .await?
            .check()?;
        Ok(())
    }

    /// Re-rank the records of `scope` to match `ordered_ids`.
    ///
    /// See [`RankManager::apply_order`].
    pub async fn reorder<S>(&self, scope: &Scope, ordered_ids: &[S]) -> DbResult<usize>
    where
        S: AsRef<str>,
    {
        self.ranks.apply_order(T::TABLE, scope, ordered_ids).await
    }

    /// Generate an id that doesn't collide with existing records.
    async fn generate_unique_id(&self, seed: &str) -> DbResult<String> {
        let mut generator = IdGenerator::new(seed);

        while let Some(id) = generator.next_id() {
            if !self.exists(&id).await? {
                return Ok(id);
            }
            trace!("Id collision in {}: {}", T::TABLE, id);
        }

        Err(DbError::IdExhausted {
            kind: T::TABLE,
            attempts: MAX_ATTEMPTS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_level_insert_is_a_plain_create() {
        let sql = insert_query("quest", &Scope::Quests);
        assert_eq!(sql, "CREATE type::thing('quest', $id) CONTENT $content");
    }

    #[test]
    fn test_owned_insert_guards_and_touches_owner() {
        let sql = insert_query("objective", &Scope::Quest("q1".to_string()));
        assert!(sql.starts_with("BEGIN TRANSACTION;"));
        assert!(sql.contains("THROW"));
        assert!(sql.contains("UPDATE type::thing('quest', $owner)"));
        assert!(sql.contains("CREATE type::thing('objective', $id)"));
        assert!(sql.trim_end().ends_with("COMMIT TRANSACTION;"));
    }
}
