//! Data models for SideQuests list management
//!
//! Defines the quest and objective records, the scope a ranked operation
//! applies within, and the row types used to deserialize SurrealDB results.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use surrealdb::sql::{Datetime, Thing};

use crate::rank::Ranked;

/// Format used for the fallback quest name, e.g. "Tuesday, 9/17/24"
pub const DEFAULT_NAME_FORMAT: &str = "%A, %-m/%-d/%y";

/// The sibling set an operation applies within
///
/// Quests are ranked against all other quests; objectives are ranked only
/// against the objectives of the same quest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// All top-level quests
    Quests,
    /// The objectives of one quest
    Quest(String),
}

impl Scope {
    /// The owning quest id, if this scope has one
    pub fn owner(&self) -> Option<&str> {
        match self {
            Scope::Quests => None,
            Scope::Quest(id) => Some(id.as_str()),
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Quests => write!(f, "quests"),
            Scope::Quest(id) => write!(f, "quest:{}", id),
        }
    }
}

/// A record stored in a ranked sibling table
///
/// Ties a domain type to its table, its raw row representation, and its
/// owning scope. Implemented by [`Quest`] and [`Objective`].
pub trait Entity: Ranked + Sized + Send {
    /// SurrealDB table name
    const TABLE: &'static str;
    /// Name used in error messages
    const KIND: &'static str;
    /// Field holding the display text
    const TEXT_FIELD: &'static str;
    /// Raw row as returned by SurrealDB
    type Row: DeserializeOwned + Send + Sync + 'static;

    /// Convert a raw row into the domain type
    fn from_row(row: Self::Row) -> Self;

    /// Owning quest id, `None` for top-level records
    fn owner(&self) -> Option<&str>;
}

/// Extract the raw string key from a SurrealDB record id
pub(crate) fn record_key(thing: &Thing) -> String {
    thing.id.to_raw()
}

/// A top-level named, ranked container
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quest {
    /// Record key
    pub id: String,
    /// Display name
    pub name: String,
    /// Sort position among all quests
    pub rank: i64,
    /// Creation timestamp, used to break rank ties
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
}

/// Internal row type for deserializing quests
#[derive(Debug, Deserialize)]
pub struct QuestRow {
    id: Thing,
    name: String,
    rank: i64,
    created_at: Datetime,
}

impl Ranked for Quest {
    fn id(&self) -> &str {
        &self.id
    }

    fn rank(&self) -> i64 {
        self.rank
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Entity for Quest {
    const TABLE: &'static str = "quest";
    const KIND: &'static str = "Quest";
    const TEXT_FIELD: &'static str = "name";
    type Row = QuestRow;

    fn from_row(row: QuestRow) -> Self {
        Self {
            id: record_key(&row.id),
            name: row.name,
            rank: row.rank,
            created_at: row.created_at.0,
        }
    }

    fn owner(&self) -> Option<&str> {
        None
    }
}

/// A ranked, completable entry owned by exactly one quest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Objective {
    /// Record key
    pub id: String,
    /// Display title
    pub title: String,
    /// Completion flag
    pub completed: bool,
    /// Sort position among the objectives of the same quest
    pub rank: i64,
    /// Key of the owning quest
    pub quest_id: String,
    /// Creation timestamp, used to break rank ties
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
}

/// Internal row type for deserializing objectives
#[derive(Debug, Deserialize)]
pub struct ObjectiveRow {
    id: Thing,
    title: String,
    #[serde(default)]
    completed: bool,
    rank: i64,
    quest_id: String,
    created_at: Datetime,
}

impl Ranked for Objective {
    fn id(&self) -> &str {
        &self.id
    }

    fn rank(&self) -> i64 {
        self.rank
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Entity for Objective {
    const TABLE: &'static str = "objective";
    const KIND: &'static str = "Objective";
    const TEXT_FIELD: &'static str = "title";
    type Row = ObjectiveRow;

    fn from_row(row: ObjectiveRow) -> Self {
        Self {
            id: record_key(&row.id),
            title: row.title,
            completed: row.completed,
            rank: row.rank,
            quest_id: row.quest_id,
            created_at: row.created_at.0,
        }
    }

    fn owner(&self) -> Option<&str> {
        Some(self.quest_id.as_str())
    }
}

/// Name given to a quest created without one, derived from `date`
pub fn default_quest_name(date: NaiveDate) -> String {
    date.format(DEFAULT_NAME_FORMAT).to_string()
}

/// Default quest name for today's local date
pub fn default_quest_name_today() -> String {
    default_quest_name(Local::now().date_naive())
}
