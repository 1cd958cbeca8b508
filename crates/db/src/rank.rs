//! Rank computation for ordered sibling sets
//!
//! Pure functions behind the rank manager: picking the rank for a newly
//! created record, planning the rank writes for a caller-supplied order,
//! and sorting siblings deterministically. No database access happens here;
//! see [`crate::repository::RankManager`] for the transactional side.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

/// A record that takes part in rank ordering
pub trait Ranked {
    /// Record key
    fn id(&self) -> &str;
    /// Current rank within its scope
    fn rank(&self) -> i64;
    /// Creation time, the first tie-breaker
    fn created_at(&self) -> DateTime<Utc>;
}

/// A single rank write produced by [`plan_order`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankAssignment {
    /// Record key to update
    pub id: String,
    /// New rank
    pub rank: i64,
}

/// Rank for a record appended to a scope whose existing ranks are `ranks`.
///
/// One past the current maximum, so the new record sorts last even when
/// earlier ranks have gaps. An empty scope starts at 0.
pub fn next_rank<I>(ranks: I) -> i64
where
    I: IntoIterator<Item = i64>,
{
    ranks
        .into_iter()
        .max()
        .map_or(0, |max| max.saturating_add(1))
}

/// Plan the rank writes for an explicit order.
///
/// Each id in `ordered_ids` gets its 0-based position as rank. Positions are
/// counted over the whole input, so skipped ids still consume an index.
/// Ids missing from `siblings` are dropped. When an id repeats, its last
/// position wins. The result is ordered by first appearance.
pub fn plan_order<S>(ordered_ids: &[S], siblings: &HashSet<String>) -> Vec<RankAssignment>
where
    S: AsRef<str>,
{
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut assignments: Vec<RankAssignment> = Vec::new();

    for (index, id) in ordered_ids.iter().enumerate() {
        let id = id.as_ref();
        if !siblings.contains(id) {
            continue;
        }
        let rank = index as i64;
        match positions.get(id) {
            Some(&slot) => assignments[slot].rank = rank,
            None => {
                positions.insert(id, assignments.len());
                assignments.push(RankAssignment {
                    id: id.to_string(),
                    rank,
                });
            }
        }
    }

    assignments
}

/// Sort siblings by rank, then creation time, then id.
pub fn sort_siblings<T: Ranked>(siblings: &mut [T]) {
    siblings.sort_by(|a, b| {
        a.rank()
            .cmp(&b.rank())
            .then_with(|| a.created_at().cmp(&b.created_at()))
            .then_with(|| a.id().cmp(b.id()))
    });
}
