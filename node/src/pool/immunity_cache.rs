use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;

use lru::LruCache;

use crate::utilities::to_hex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AddOutcome {
    Added,
    AlreadyPresent,
    /// Every stored entry is immune, nothing could be evicted.
    CapacityReached,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ImmunizeOutcome {
    /// Keys that were present and are now immune.
    pub(crate) now_immune: usize,
    /// Keys not present yet, they become immune when added.
    pub(crate) future_immune: usize,
}

/// LRU cache where immune entries are excluded from eviction.
///
/// Immune entries still count towards the capacity. A key with a pending immunity is always
/// admitted, even when nothing can be evicted to make room for it. Other keys are rejected
/// once every stored entry is immune.
pub(crate) struct ImmunityCache<V> {
    capacity: NonZeroUsize,
    evictable: LruCache<Vec<u8>, V>,
    immune: HashMap<Vec<u8>, V>,
    pending_immunity: HashSet<Vec<u8>>,
}

impl<V: Clone> ImmunityCache<V> {
    pub(crate) fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            evictable: LruCache::unbounded(),
            immune: HashMap::new(),
            pending_immunity: HashSet::new(),
        }
    }

    pub(crate) fn add(&mut self, key: &[u8], value: V) -> AddOutcome {
        if self.contains(key) {
            return AddOutcome::AlreadyPresent;
        }

        let immune = self.pending_immunity.contains(key);
        if self.len() >= self.capacity.get() {
            match self.evictable.pop_lru() {
                Some((evicted, _)) => log::trace!("Evicted {}", to_hex(&evicted)),
                None if immune => log::trace!("Admitting immune {} over capacity", to_hex(key)),
                None => return AddOutcome::CapacityReached,
            }
        }

        if immune {
            self.pending_immunity.remove(key);
            self.immune.insert(key.to_vec(), value);
        } else {
            self.evictable.put(key.to_vec(), value);
        }
        AddOutcome::Added
    }

    /// Reads without touching the eviction order.
    pub(crate) fn peek(&self, key: &[u8]) -> Option<&V> {
        self.immune.get(key).or_else(|| self.evictable.peek(key))
    }

    pub(crate) fn contains(&self, key: &[u8]) -> bool {
        self.immune.contains_key(key) || self.evictable.contains(key)
    }

    pub(crate) fn remove(&mut self, key: &[u8]) -> Option<V> {
        self.pending_immunity.remove(key);
        self.immune
            .remove(key)
            .or_else(|| self.evictable.pop(key))
    }

    pub(crate) fn immunize(&mut self, keys: &[Vec<u8>]) -> ImmunizeOutcome {
        let mut outcome = ImmunizeOutcome::default();
        for key in keys {
            if self.immune.contains_key(key) {
                outcome.now_immune += 1;
                continue;
            }
            if let Some(value) = self.evictable.pop(key) {
                self.immune.insert(key.clone(), value);
                outcome.now_immune += 1;
                continue;
            }
            self.pending_immunity.insert(key.clone());
            outcome.future_immune += 1;
        }
        outcome
    }

    pub(crate) fn is_immune(&self, key: &[u8]) -> bool {
        self.immune.contains_key(key) || self.pending_immunity.contains(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.immune.len() + self.evictable.len()
    }

    pub(crate) fn immune_len(&self) -> usize {
        self.immune.len()
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.pending_immunity.len()
    }
}
