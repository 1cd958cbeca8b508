//! Quest repository
//!
//! Top-level quests, ranked against each other. Deleting a quest removes
//! its objectives in the same transaction.

use serde::Serialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tracing::debug;

use super::SiblingRepository;
use crate::error::{DbError, DbResult};
use crate::models::{Entity, Objective, Quest, Scope, default_quest_name_today};

/// Field values written when creating a quest
#[derive(Debug, Serialize)]
struct NewQuest {
    name: String,
    rank: i64,
}

/// Repository for quest CRUD and ordering
pub struct QuestRepository<'a> {
    client: &'a Surreal<Db>,
    siblings: SiblingRepository<'a, Quest>,
}

impl<'a> QuestRepository<'a> {
    /// Create a new QuestRepository with the given database client
    pub fn new(client: &'a Surreal<Db>) -> Self {
        Self {
            client,
            siblings: SiblingRepository::new(client),
        }
    }

    /// Create a quest at the end of the quest list.
    ///
    /// A blank name falls back to today's date, e.g. "Tuesday, 9/17/24".
    pub async fn create(&self, name: &str) -> DbResult<Quest> {
        let name = match name.trim() {
            "" => default_quest_name_today(),
            trimmed => trimmed.to_string(),
        };

        let seed = name.clone();
        self.siblings
            .insert(&Scope::Quests, &seed, move |rank| NewQuest { name, rank })
            .await
    }

    /// Get a quest by id.
    pub async fn get(&self, id: &str) -> DbResult<Option<Quest>> {
        self.siblings.get(id).await
    }

    /// Check if a quest with the given id exists.
    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        self.siblings.exists(id).await
    }

    /// Fetch a quest or fail with `DbError::NotFound`.
    pub async fn require(&self, id: &str) -> DbResult<Quest> {
        self.siblings.find_in_scope(&Scope::Quests, id).await
    }

    /// All quests in display order.
    pub async fn list(&self) -> DbResult<Vec<Quest>> {
        self.siblings.list(&Scope::Quests).await
    }

    /// Rename a quest.
    ///
    /// # Errors
    ///
    /// Returns `DbError::ValidationError` if the trimmed name is empty.
    /// Returns `DbError::NotFound` if the quest doesn't exist.
    pub async fn rename(&self, id: &str, name: &str) -> DbResult<()> {
        self.siblings.rename(&Scope::Quests, id, name).await
    }

    /// Delete a quest and all of its objectives atomically.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if the quest doesn't exist, including on
    /// a repeated delete.
    /// Returns `DbError::Transaction` if the cascade fails; nothing is removed.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        self.require(id).await?;

        debug!("Deleting quest {} with its objectives", id);
        let query = format!(
            r#"BEGIN TRANSACTION;
            DELETE {objective} WHERE quest_id = $id;
            DELETE type::thing('{quest}', $id);
            COMMIT TRANSACTION;"#,
            objective = Objective::TABLE,
            quest = Quest::TABLE,
        );

        let response = self
            .client
            .query(&query)
            .bind(("id", id.to_string()))
            .await
            .map_err(|e| DbError::Transaction(Box::new(e)))?;
        response
            .check()
            .map_err(|e| DbError::Transaction(Box::new(e)))?;
        Ok(())
    }

    /// Re-rank quests to match `ordered_ids`.
    ///
    /// Unknown ids are skipped. Quests left out keep their current rank.
    pub async fn reorder<S>(&self, ordered_ids: &[S]) -> DbResult<usize>
    where
        S: AsRef<str>,
    {
        self.siblings.reorder(&Scope::Quests, ordered_ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use crate::models::default_quest_name;
    use chrono::Local;
    use std::env;

    /// Helper to create a test database
    async fn setup_test_db() -> (Database, std::path::PathBuf) {
        let temp_dir = env::temp_dir().join(format!(
            "sidequests-quest-repo-test-{}-{:?}-{}",
            std::process::id(),
            std::thread::current().id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));

        let db = Database::connect(&temp_dir).await.unwrap();
        db.init().await.unwrap();

        (db, temp_dir)
    }

    /// Clean up test database
    fn cleanup(path: &std::path::Path) {
        let _ = std::fs::remove_dir_all(path);
    }

    fn names(quests: &[Quest]) -> Vec<&str> {
        quests.iter().map(|q| q.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_create_first_quest_gets_rank_zero() {
        let (db, temp_dir) = setup_test_db().await;
        let repo = QuestRepository::new(db.client());

        let quest = repo.create("Errands").await.unwrap();

        assert_eq!(quest.name, "Errands");
        assert_eq!(quest.rank, 0);
        assert_eq!(quest.id.len(), crate::id::ID_LENGTH);

        cleanup(&temp_dir);
    }

    #[tokio::test]
    async fn test_create_trims_name() {
        let (db, temp_dir) = setup_test_db().await;
        let repo = QuestRepository::new(db.client());

        let quest = repo.create("  Garden  ").await.unwrap();
        assert_eq!(quest.name, "Garden");

        cleanup(&temp_dir);
    }

    #[tokio::test]
    async fn test_create_blank_name_uses_date() {
        let (db, temp_dir) = setup_test_db().await;
        let repo = QuestRepository::new(db.client());

        let before = default_quest_name(Local::now().date_naive());
        let quest = repo.create("   ").await.unwrap();
        let after = default_quest_name(Local::now().date_naive());

        assert!(
            quest.name == before || quest.name == after,
            "Unexpected default name: {}",
            quest.name
        );

        cleanup(&temp_dir);
    }

    #[tokio::test]
    async fn test_list_in_creation_order() {
        let (db, temp_dir) = setup_test_db().await;
        let repo = QuestRepository::new(db.client());

        for name in ["One", "Two", "Three", "Four"] {
            repo.create(name).await.unwrap();
        }

        let quests = repo.list().await.unwrap();
        assert_eq!(names(&quests), vec!["One", "Two", "Three", "Four"]);
        let ranks: Vec<i64> = quests.iter().map(|q| q.rank).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3]);

        cleanup(&temp_dir);
    }

    #[tokio::test]
    async fn test_create_after_gap_sorts_last() {
        let (db, temp_dir) = setup_test_db().await;
        let repo = QuestRepository::new(db.client());

        let a = repo.create("A").await.unwrap();
        let b = repo.create("B").await.unwrap();
        // Leave a gap: A at 0, B at 10
        repo.reorder(&[a.id.as_str(), "x", "x", "x", "x", "x", "x", "x", "x", "x", b.id.as_str()])
            .await
            .unwrap();

        let c = repo.create("C").await.unwrap();
        assert_eq!(c.rank, 11);
        assert_eq!(names(&repo.list().await.unwrap()), vec!["A", "B", "C"]);

        cleanup(&temp_dir);
    }

    #[tokio::test]
    async fn test_reorder_full_reverse() {
        let (db, temp_dir) = setup_test_db().await;
        let repo = QuestRepository::new(db.client());

        let mut ids = Vec::new();
        for name in ["One", "Two", "Three"] {
            ids.push(repo.create(name).await.unwrap().id);
        }
        ids.reverse();

        let written = repo.reorder(&ids).await.unwrap();
        assert_eq!(written, 3);
        assert_eq!(
            names(&repo.list().await.unwrap()),
            vec!["Three", "Two", "One"]
        );

        cleanup(&temp_dir);
    }

    #[tokio::test]
    async fn test_reorder_tolerates_unknown_ids() {
        let (db, temp_dir) = setup_test_db().await;
        let repo = QuestRepository::new(db.client());

        repo.create("First").await.unwrap();
        let second = repo.create("Second").await.unwrap();

        repo.reorder(&[second.id.as_str(), "nonexistent-id"])
            .await
            .unwrap();

        let moved = repo.get(&second.id).await.unwrap().unwrap();
        assert_eq!(moved.rank, 0);

        cleanup(&temp_dir);
    }

    #[tokio::test]
    async fn test_partial_reorder_keeps_omitted_ranks() {
        let (db, temp_dir) = setup_test_db().await;
        let repo = QuestRepository::new(db.client());

        let a = repo.create("A").await.unwrap();
        let b = repo.create("B").await.unwrap();
        let c = repo.create("C").await.unwrap();

        repo.reorder(&[c.id.as_str()]).await.unwrap();

        assert_eq!(repo.get(&a.id).await.unwrap().unwrap().rank, 0);
        assert_eq!(repo.get(&b.id).await.unwrap().unwrap().rank, 1);
        assert_eq!(repo.get(&c.id).await.unwrap().unwrap().rank, 0);

        cleanup(&temp_dir);
    }

    #[tokio::test]
    async fn test_rename_quest() {
        let (db, temp_dir) = setup_test_db().await;
        let repo = QuestRepository::new(db.client());

        let quest = repo.create("Old").await.unwrap();
        repo.rename(&quest.id, "  New  ").await.unwrap();

        let renamed = repo.get(&quest.id).await.unwrap().unwrap();
        assert_eq!(renamed.name, "New");
        assert_eq!(renamed.rank, quest.rank);

        cleanup(&temp_dir);
    }

    #[tokio::test]
    async fn test_rename_blank_fails_before_lookup() {
        let (db, temp_dir) = setup_test_db().await;
        let repo = QuestRepository::new(db.client());

        let result = repo.rename("missing", "  ").await;
        assert!(matches!(result, Err(DbError::ValidationError { .. })));

        cleanup(&temp_dir);
    }

    #[tokio::test]
    async fn test_rename_missing_quest() {
        let (db, temp_dir) = setup_test_db().await;
        let repo = QuestRepository::new(db.client());

        let result = repo.rename("missing", "Name").await;
        assert!(matches!(result, Err(DbError::NotFound { kind: "Quest", .. })));

        cleanup(&temp_dir);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_objectives() {
        let (db, temp_dir) = setup_test_db().await;
        let quests = db.quests();
        let objectives = db.objectives();

        let doomed = quests.create("Doomed").await.unwrap();
        let kept = quests.create("Kept").await.unwrap();
        let mut ids = Vec::new();
        for title in ["a", "b", "c"] {
            ids.push(objectives.create(&doomed.id, title).await.unwrap().id);
        }
        let survivor = objectives.create(&kept.id, "stays").await.unwrap();

        quests.delete(&doomed.id).await.unwrap();

        assert!(quests.get(&doomed.id).await.unwrap().is_none());
        for id in &ids {
            assert!(objectives.get(id).await.unwrap().is_none());
        }
        assert!(matches!(
            objectives.list(&doomed.id).await,
            Err(DbError::NotFound { kind: "Quest", .. })
        ));
        assert!(objectives.get(&survivor.id).await.unwrap().is_some());

        cleanup(&temp_dir);
    }

    #[tokio::test]
    async fn test_delete_twice_reports_not_found() {
        let (db, temp_dir) = setup_test_db().await;
        let repo = QuestRepository::new(db.client());

        let quest = repo.create("Once").await.unwrap();
        repo.delete(&quest.id).await.unwrap();

        let again = repo.delete(&quest.id).await;
        assert!(matches!(again, Err(DbError::NotFound { .. })));

        cleanup(&temp_dir);
    }
}
