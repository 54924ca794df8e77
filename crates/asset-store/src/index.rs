//! In-memory record key → category index.
//!
//! The index is rebuilt from a full corpus scan when a repository opens. Creation reserves a key
//! before any file is touched, so two concurrent creates of the same key in different categories
//! can't both succeed. An update claims the key for its whole duration, so a second write to the
//! same key is turned away instead of racing the first.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{Result, StoreError};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Slot {
    Committed(String),
    Reserved(String),
    /// An update is rewriting the row stored in this category.
    Claimed(String),
}

impl Slot {
    fn category(&self) -> &str {
        match self {
            Slot::Committed(category) | Slot::Reserved(category) | Slot::Claimed(category) => {
                category
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct KeyIndex {
    slots: Mutex<HashMap<String, Slot>>,
}

impl KeyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the index contents with `(key, category)` pairs from a corpus scan.
    ///
    /// The first occurrence of a key wins; later duplicates are logged.
    pub fn rebuild(&self, entries: impl IntoIterator<Item = (String, String)>) {
        let mut slots = self.slots();
        slots.clear();
        for (key, category) in entries {
            if let Some(existing) = slots.get(&key) {
                log::warn!(
                    "record key `{key}` appears in both `{}` and `{category}`",
                    existing.category()
                );
                continue;
            }
            slots.insert(key, Slot::Committed(category));
        }
    }

    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Category holding `key`, if it is stored (or being stored).
    pub fn category_of(&self, key: &str) -> Option<String> {
        self.slots().get(key).map(|slot| slot.category().to_string())
    }

    /// Claim `key` for a pending write into `category`.
    ///
    /// Fails with [`StoreError::DuplicateKey`] naming the category that already holds the key.
    /// The reservation is released when the returned guard drops without being committed.
    pub fn reserve(self: &Arc<Self>, key: &str, category: &str) -> Result<KeyReservation> {
        let mut slots = self.slots();
        if let Some(existing) = slots.get(key) {
            return Err(StoreError::DuplicateKey {
                key: key.to_string(),
                category: existing.category().to_string(),
            });
        }
        slots.insert(key.to_string(), Slot::Reserved(category.to_string()));
        Ok(KeyReservation {
            index: Arc::clone(self),
            key: key.to_string(),
            committed: false,
        })
    }

    /// Take exclusive hold of a stored `key` for an update.
    ///
    /// Returns `Ok(None)` when the key isn't stored anywhere and [`StoreError::KeyBusy`] while
    /// another create or update holds it. Dropping the claim without finishing it leaves the key
    /// where it was.
    pub fn claim(self: &Arc<Self>, key: &str) -> Result<Option<KeyClaim>> {
        let mut slots = self.slots();
        let Some(slot) = slots.get_mut(key) else {
            return Ok(None);
        };
        let category = match slot {
            Slot::Committed(category) => category.clone(),
            Slot::Reserved(_) | Slot::Claimed(_) => {
                return Err(StoreError::KeyBusy {
                    key: key.to_string(),
                })
            }
        };
        *slot = Slot::Claimed(category.clone());
        Ok(Some(KeyClaim {
            index: Arc::clone(self),
            key: key.to_string(),
            category,
            finished: false,
        }))
    }

    /// Record that `key` is stored in `category`, replacing any previous entry.
    pub fn insert(&self, key: &str, category: &str) {
        self.slots()
            .insert(key.to_string(), Slot::Committed(category.to_string()));
    }

    pub fn remove(&self, key: &str) {
        self.slots().remove(key);
    }
}

/// A pending key claim. Dropping it without [`KeyReservation::commit`] frees the key again.
#[derive(Debug)]
pub struct KeyReservation {
    index: Arc<KeyIndex>,
    key: String,
    committed: bool,
}

impl KeyReservation {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Mark the key as stored in `category`.
    pub fn commit(mut self, category: &str) {
        self.index.insert(&self.key, category);
        self.committed = true;
    }
}

impl Drop for KeyReservation {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        let mut slots = self.index.slots();
        if matches!(slots.get(&self.key), Some(Slot::Reserved(_))) {
            slots.remove(&self.key);
        }
    }
}

/// Exclusive hold on a stored key for the length of an update.
#[derive(Debug)]
pub struct KeyClaim {
    index: Arc<KeyIndex>,
    key: String,
    category: String,
    finished: bool,
}

impl KeyClaim {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Category the key was stored in when the claim was taken.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// The row now lives in `category` under the same key.
    pub fn commit(mut self, category: &str) {
        self.index.insert(&self.key, category);
        self.finished = true;
    }

    /// The row was stored under a new key; this one is free again.
    pub fn retire(mut self) {
        self.index.remove(&self.key);
        self.finished = true;
    }
}

impl Drop for KeyClaim {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let mut slots = self.index.slots();
        if let Some(slot) = slots.get_mut(&self.key) {
            if matches!(slot, Slot::Claimed(_)) {
                *slot = Slot::Committed(self.category.clone());
            }
        }
    }
}
