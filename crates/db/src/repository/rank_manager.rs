//! Transactional rank manager
//!
//! Reads current ranks from the store and applies rank plans produced by
//! [`crate::rank`]. Shared by the quest and objective repositories.

use std::collections::HashSet;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use surrealdb::sql::Thing;
use tracing::{debug, trace};

use crate::error::{DbError, DbResult};
use crate::models::{Scope, record_key};
use crate::rank::{self, RankAssignment};

/// Computes and applies ranks within a scope of one table
pub struct RankManager<'a> {
    client: &'a Surreal<Db>,
}

/// `WHERE` clause restricting a query to the siblings of `scope`
fn scope_filter(scope: &Scope) -> &'static str {
    match scope {
        Scope::Quests => "",
        Scope::Quest(_) => " WHERE quest_id = $owner",
    }
}

/// Build the transaction that writes every assignment in `plan`.
///
/// Each statement targets one record and, for objective scopes, re-checks
/// ownership so a record can never be ranked into a foreign quest.
fn build_order_transaction(table: &str, scope: &Scope, plan: &[RankAssignment]) -> String {
    let filter = scope_filter(scope);
    let mut sql = String::from("BEGIN TRANSACTION;\n");
    for index in 0..plan.len() {
        sql.push_str(&format!(
            "UPDATE type::thing('{}', $id_{index}) SET rank = $rank_{index}{};\n",
            table, filter
        ));
    }
    sql.push_str("COMMIT TRANSACTION;\n");
    sql
}

impl<'a> RankManager<'a> {
    /// Create a new RankManager with the given database client
    pub fn new(client: &'a Surreal<Db>) -> Self {
        Self { client }
    }

    /// Rank for a new record appended to `scope`.
    ///
    /// Computed from the persisted ranks at call time. Two concurrent
    /// callers may receive the same value; the resulting tie is broken by
    /// creation time when listing.
    pub async fn next_rank(&self, table: &str, scope: &Scope) -> DbResult<i64> {
        let query = format!("SELECT VALUE rank FROM {}{}", table, scope_filter(scope));
        let mut request = self.client.query(&query);
        if let Some(owner) = scope.owner() {
            request = request.bind(("owner", owner.to_string()));
        }
        let mut result = request.await?;
        let ranks: Vec<i64> = result.take(0)?;

        let next = rank::next_rank(ranks);
        trace!("Next rank in {} {}: {}", table, scope, next);
        Ok(next)
    }

    /// Keys of every record currently in `scope`
    pub async fn sibling_ids(&self, table: &str, scope: &Scope) -> DbResult<HashSet<String>> {
        let query = format!("SELECT VALUE id FROM {}{}", table, scope_filter(scope));
        let mut request = self.client.query(&query);
        if let Some(owner) = scope.owner() {
            request = request.bind(("owner", owner.to_string()));
        }
        let mut result = request.await?;
        let ids: Vec<Thing> = result.take(0)?;

        Ok(ids.iter().map(record_key).collect())
    }

    /// Rank the records named in `ordered_ids` by their position.
    ///
    /// Ids not in `scope` are skipped. Records left out of `ordered_ids`
    /// keep their current rank. All writes commit together or not at all.
    ///
    /// # Returns
    ///
    /// The number of records whose rank was written.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Transaction` if the batch fails; nothing is applied.
    /// Returns `DbError::Query` if reading the current siblings fails.
    pub async fn apply_order<S>(
        &self,
        table: &str,
        scope: &Scope,
        ordered_ids: &[S],
    ) -> DbResult<usize>
    where
        S: AsRef<str>,
    {
        let siblings = self.sibling_ids(table, scope).await?;
        let plan = rank::plan_order(ordered_ids, &siblings);
        debug!(
            "Applying order in {} {}: {} submitted, {} matched",
            table,
            scope,
            ordered_ids.len(),
            plan.len()
        );

        if plan.is_empty() {
            return Ok(0);
        }

        let sql = build_order_transaction(table, scope, &plan);
        trace!("Query: {}", sql);

        let mut request = self.client.query(sql);
        if let Some(owner) = scope.owner() {
            request = request.bind(("owner", owner.to_string()));
        }
        for (index, assignment) in plan.iter().enumerate() {
            request = request
                .bind((format!("id_{index}"), assignment.id.clone()))
                .bind((format!("rank_{index}"), assignment.rank));
        }

        let response = request.await.map_err(|e| {
            debug!("Order transaction failed in {} {}: {}", table, scope, e);
            DbError::Transaction(Box::new(e))
        })?;
        response.check().map_err(|e| {
            debug!("Order transaction rolled back in {} {}: {}", table, scope, e);
            DbError::Transaction(Box::new(e))
        })?;

        Ok(plan.len())
    }
}
