//! Query cache invalidation registry.
//!
//! List views subscribe and refetch whenever their key is invalidated.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tokio::sync::broadcast;
use tracing::debug;

const INVALIDATION_CAPACITY: usize = 64;

/// Emitted once per invalidation of a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invalidation {
    pub key: String,
    pub generation: u64,
}

pub struct QueryCache {
    generations: Mutex<HashMap<String, u64>>,
    sender: broadcast::Sender<Invalidation>,
}

impl QueryCache {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(INVALIDATION_CAPACITY);
        Self {
            generations: Mutex::new(HashMap::new()),
            sender,
        }
    }

    /// Marks `key` stale and notifies subscribers; returns the new generation
    pub fn invalidate(&self, key: &str) -> u64 {
        let generation = {
            let mut generations = self
                .generations
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let entry = generations.entry(key.to_string()).or_insert(0);
            *entry += 1;
            *entry
        };

        debug!("Query '{}' invalidated (generation {})", key, generation);

        // No subscribers is fine
        let _ = self.sender.send(Invalidation {
            key: key.to_string(),
            generation,
        });

        generation
    }

    /// How many times `key` has been invalidated
    pub fn generation(&self, key: &str) -> u64 {
        self.generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Invalidation> {
        self.sender.subscribe()
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}
