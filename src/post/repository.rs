//! In-memory post store.
//!
//! A [`DashMap`] keyed by id plus an atomic counter. Every operation is a
//! single per-key map step, so there are no cross-key transactions and no
//! nested locks. Two writers on the same id: last one to finish wins.

use std::sync::atomic::{AtomicI64, Ordering};

use dashmap::DashMap;
use serde::Deserialize;
use tracing::debug;

use super::model::{Post, UNASSIGNED};

/// What `remove_by_id` does to a live post.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletePolicy {
    /// Keep the record and flag it removed. It is never visible again.
    #[default]
    Soft,
    /// Drop the record from the map.
    Hard,
}

/// Thread-safe post storage. Share it behind an `Arc`.
#[derive(Debug, Default)]
pub struct PostRepository {
    last_id: AtomicI64,
    storage: DashMap<i64, Post>,
    policy: DeletePolicy,
}

impl PostRepository {
    pub fn new(policy: DeletePolicy) -> Self {
        Self { last_id: AtomicI64::new(UNASSIGNED), storage: DashMap::new(), policy }
    }

    pub fn policy(&self) -> DeletePolicy { self.policy }

    /// Every live post, in no particular order.
    pub fn all(&self) -> Vec<Post> {
        self.storage.iter()
            .filter(|entry| !entry.removed)
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// The live post with `id`. Never matches id `0`.
    pub fn get_by_id(&self, id: i64) -> Option<Post> {
        if id == UNASSIGNED {
            return None;
        }
        self.storage.get(&id)
            .filter(|entry| !entry.removed)
            .map(|entry| entry.value().clone())
    }

    /// Updates a live post in place, or inserts under a fresh id.
    ///
    /// A post whose id is `0`, unknown, or removed is stored as new: the
    /// supplied id is discarded and the next counter value is assigned.
    pub fn save(&self, post: Post) -> Post {
        match self.try_replace(post) {
            Ok(updated) => updated,
            Err(post) => self.insert_new(post),
        }
    }

    /// Overwrites the live post with the same id. `None` if there is none;
    /// never inserts.
    pub fn replace(&self, post: Post) -> Option<Post> {
        self.try_replace(post).ok()
    }

    /// Removes the live post with `id` according to the delete policy.
    /// Returns whether a live post was found.
    pub fn remove_by_id(&self, id: i64) -> bool {
        let removed = match self.policy {
            DeletePolicy::Soft => match self.storage.get_mut(&id) {
                Some(mut entry) if !entry.removed => {
                    entry.removed = true;
                    true
                }
                _ => false,
            },
            DeletePolicy::Hard => self.storage.remove_if(&id, |_, p| !p.removed).is_some(),
        };
        if removed {
            debug!(id, policy = ?self.policy, "post removed");
        }
        removed
    }

    /// Number of records physically held, removed ones included.
    pub fn stored_len(&self) -> usize {
        self.storage.len()
    }

    /// Check-and-write under the entry's shard lock. Hands the post back
    /// when there is no live record to overwrite.
    fn try_replace(&self, post: Post) -> Result<Post, Post> {
        if post.is_new() {
            return Err(post);
        }
        let Some(mut entry) = self.storage.get_mut(&post.id) else {
            return Err(post);
        };
        if entry.removed {
            return Err(post);
        }
        let post = Post { removed: false, ..post };
        *entry = post.clone();
        debug!(id = post.id, "post updated");
        Ok(post)
    }

    fn insert_new(&self, post: Post) -> Post {
        let id = self.last_id.fetch_add(1, Ordering::Relaxed) + 1;
        let post = Post { id, removed: false, ..post };
        self.storage.insert(id, post.clone());
        debug!(id, "post created");
        post
    }
}
