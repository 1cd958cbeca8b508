//! Repository modules for database operations
//!
//! Provides repository pattern implementations for quests and objectives,
//! built on a shared ranked-sibling repository and rank manager.

mod objective;
mod quest;
mod rank_manager;
mod siblings;

pub use objective::ObjectiveRepository;
pub use quest::QuestRepository;
pub use rank_manager::RankManager;
pub use siblings::SiblingRepository;
