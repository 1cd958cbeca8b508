//! Objective repository
//!
//! Objectives are ranked only against the objectives of the same quest.
//! Every operation takes the quest id as its scope and refuses to touch an
//! objective that belongs to a different quest.

use serde::Serialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tracing::{debug, trace};

use super::{QuestRepository, SiblingRepository};
use crate::error::{DbError, DbResult};
use crate::models::{Entity, Objective, ObjectiveRow, Scope};

/// Tries at flipping completion before a conflict is reported
pub const TOGGLE_ATTEMPTS: usize = 5;

/// Field values written when creating an objective
#[derive(Debug, Serialize)]
struct NewObjective {
    title: String,
    completed: bool,
    rank: i64,
    quest_id: String,
}

/// Repository for objective CRUD, completion, and ordering
pub struct ObjectiveRepository<'a> {
    client: &'a Surreal<Db>,
    siblings: SiblingRepository<'a, Objective>,
    quests: QuestRepository<'a>,
}

impl<'a> ObjectiveRepository<'a> {
    /// Create a new ObjectiveRepository with the given database client
    pub fn new(client: &'a Surreal<Db>) -> Self {
        Self {
            client,
            siblings: SiblingRepository::new(client),
            quests: QuestRepository::new(client),
        }
    }

    /// Fail with `DbError::NotFound` unless the quest exists
    async fn require_quest(&self, quest_id: &str) -> DbResult<()> {
        if self.quests.exists(quest_id).await? {
            Ok(())
        } else {
            Err(DbError::NotFound {
                kind: "Quest",
                id: quest_id.to_string(),
            })
        }
    }

    /// Create an objective at the end of a quest.
    ///
    /// The quest is checked again inside the insert transaction, so a quest
    /// deleted concurrently never ends up with a new objective.
    ///
    /// # Errors
    ///
    /// Returns `DbError::ValidationError` if the trimmed title is empty.
    /// Returns `DbError::NotFound` if the quest doesn't exist.
    /// Returns `DbError::Transaction` if a concurrent write to the quest
    /// conflicts; nothing is created.
    pub async fn create(&self, quest_id: &str, title: &str) -> DbResult<Objective> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DbError::validation("Objective title is required."));
        }
        self.require_quest(quest_id).await?;

        let new = NewObjective {
            title: title.to_string(),
            completed: false,
            rank: 0,
            quest_id: quest_id.to_string(),
        };
        let created = self
            .siblings
            .insert(&Scope::Quest(quest_id.to_string()), title, move |rank| {
                NewObjective { rank, ..new }
            })
            .await;

        match created {
            Err(DbError::Transaction(source)) => {
                // The guard fails when the quest vanished mid-create
                self.require_quest(quest_id).await?;
                Err(DbError::Transaction(source))
            }
            other => other,
        }
    }

    /// Get an objective by id, regardless of quest.
    pub async fn get(&self, id: &str) -> DbResult<Option<Objective>> {
        self.siblings.get(id).await
    }

    /// Objectives of a quest in display order.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if the quest doesn't exist.
    pub async fn list(&self, quest_id: &str) -> DbResult<Vec<Objective>> {
        self.require_quest(quest_id).await?;
        self.siblings
            .list(&Scope::Quest(quest_id.to_string()))
            .await
    }

    /// Rename an objective.
    ///
    /// # Errors
    ///
    /// Returns `DbError::ValidationError` if the trimmed title is empty.
    /// Returns `DbError::NotFound` if the objective doesn't exist.
    /// Returns `DbError::ScopeMismatch` if it belongs to another quest.
    pub async fn rename(&self, quest_id: &str, id: &str, title: &str) -> DbResult<()> {
        self.siblings
            .rename(&Scope::Quest(quest_id.to_string()), id, title)
            .await
    }

    /// Flip the completion flag of an objective.
    ///
    /// The flip is a single `UPDATE` evaluated by the store, retried when a
    /// concurrent write conflicts, so concurrent toggles never collapse
    /// into one.
    ///
    /// # Returns
    ///
    /// The new completion state.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if the objective doesn't exist.
    /// Returns `DbError::ScopeMismatch` if it belongs to another quest.
    /// Returns `DbError::Transaction` if conflicts persist after
    /// [`TOGGLE_ATTEMPTS`] tries.
    pub async fn toggle_completion(&self, quest_id: &str, id: &str) -> DbResult<bool> {
        let scope = Scope::Quest(quest_id.to_string());
        self.siblings.find_in_scope(&scope, id).await?;

        let mut attempt = 1;
        loop {
            match self.flip_completed(quest_id, id).await {
                Ok(Some(completed)) => {
                    debug!("Objective {} completed = {}", id, completed);
                    return Ok(completed);
                }
                Ok(None) => {
                    // Deleted or gone from this quest since the lookup
                    self.siblings.find_in_scope(&scope, id).await?;
                    return Err(DbError::NotFound {
                        kind: "Objective",
                        id: id.to_string(),
                    });
                }
                Err(DbError::Transaction(source)) if attempt < TOGGLE_ATTEMPTS => {
                    trace!("Toggle of {} conflicted (attempt {}): {}", id, attempt, source);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Negate `completed` in place, returning the stored value or `None`
    /// when no objective with this id belongs to the quest.
    async fn flip_completed(&self, quest_id: &str, id: &str) -> DbResult<Option<bool>> {
        let mut result = self
            .client
            .query(
                "UPDATE type::thing('objective', $id) SET completed = !completed \
                 WHERE quest_id = $owner RETURN AFTER",
            )
            .bind(("id", id.to_string()))
            .bind(("owner", quest_id.to_string()))
            .await?
            .check()?;
        let row: Option<ObjectiveRow> = result.take(0)?;
        Ok(row.map(|row| Objective::from_row(row).completed))
    }

    /// Delete an objective.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if the objective doesn't exist.
    /// Returns `DbError::ScopeMismatch` if it belongs to another quest.
    pub async fn delete(&self, quest_id: &str, id: &str) -> DbResult<()> {
        self.siblings
            .delete(&Scope::Quest(quest_id.to_string()), id)
            .await
    }

    /// Re-rank the objectives of a quest to match `ordered_ids`.
    ///
    /// Unknown ids and ids of other quests' objectives are skipped.
    /// Objectives left out keep their current rank.
    pub async fn reorder<S>(&self, quest_id: &str, ordered_ids: &[S]) -> DbResult<usize>
    where
        S: AsRef<str>,
    {
        self.siblings
            .reorder(&Scope::Quest(quest_id.to_string()), ordered_ids)
            .await
    }
}
