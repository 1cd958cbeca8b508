//! Short record id generation
//!
//! Ids are the first characters of a SHA-256 digest over the seed text
//! (quest name or objective title) plus a random nonce. Callers check each
//! candidate for collisions and ask for the next one until a free id turns up.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of generated ids
pub const ID_LENGTH: usize = 6;

/// Maximum number of candidates produced before giving up
pub const MAX_ATTEMPTS: usize = 16;

/// Produces candidate ids for a new record
pub struct IdGenerator {
    seed: String,
    attempts: usize,
}

impl IdGenerator {
    /// Create a generator seeded with the record's display text
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            attempts: 0,
        }
    }

    /// Next candidate id, or `None` once [`MAX_ATTEMPTS`] have been handed out
    pub fn next_id(&mut self) -> Option<String> {
        if self.attempts >= MAX_ATTEMPTS {
            return None;
        }
        self.attempts += 1;

        let nonce: u64 = rand::rng().random();
        let mut hasher = Sha256::new();
        hasher.update(self.seed.as_bytes());
        hasher.update(nonce.to_le_bytes());
        let digest = format!("{:x}", hasher.finalize());

        Some(digest[..ID_LENGTH].to_string())
    }

    /// Number of candidates handed out so far
    pub fn attempts(&self) -> usize {
        self.attempts
    }
}
