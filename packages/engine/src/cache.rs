use crate::snapshot::Snapshot;
use std::collections::HashMap;
use std::hash::Hash;

/// Last known snapshot per element, keyed by node identity. Entries are
/// evicted on detach or when the host no longer knows the node.
#[derive(Debug, Clone)]
pub struct PropertyCache<N> {
    snapshots: HashMap<N, Snapshot>,
}

impl<N: Clone + Eq + Hash> PropertyCache<N> {
    pub fn new() -> Self {
        Self {
            snapshots: HashMap::new(),
        }
    }

    pub fn get(&self, node: &N) -> Option<&Snapshot> {
        self.snapshots.get(node)
    }

    pub fn contains(&self, node: &N) -> bool {
        self.snapshots.contains_key(node)
    }

    pub fn insert(&mut self, node: N, snapshot: Snapshot) {
        self.snapshots.insert(node, snapshot);
    }

    /// Replaces the cached snapshot with one overlaid by `update`. Unknown
    /// nodes are left alone and yield `None`.
    pub fn update(&mut self, node: &N, update: &Snapshot) -> Option<Snapshot> {
        let cached = self.snapshots.get_mut(node)?;
        *cached = cached.merge(update);
        Some(*cached)
    }

    pub fn remove(&mut self, node: &N) -> Option<Snapshot> {
        self.snapshots.remove(node)
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl<N: Clone + Eq + Hash> Default for PropertyCache<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Previous match state per (element, behavior) pair, for edge-triggered
/// callbacks
#[derive(Debug, Clone)]
pub struct TransitionCache<N> {
    matched: HashMap<(N, usize), bool>,
}

impl<N: Clone + Eq + Hash> TransitionCache<N> {
    pub fn new() -> Self {
        Self {
            matched: HashMap::new(),
        }
    }

    /// Stores the new state and returns the previous one (false if unseen)
    pub fn record(&mut self, node: &N, behavior: usize, matched: bool) -> bool {
        self.matched
            .insert((node.clone(), behavior), matched)
            .unwrap_or(false)
    }

    pub fn forget(&mut self, node: &N) {
        self.matched.retain(|(key, _), _| key != node);
    }

    pub fn clear(&mut self) {
        self.matched.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.matched.is_empty()
    }
}

impl<N: Clone + Eq + Hash> Default for TransitionCache<N> {
    fn default() -> Self {
        Self::new()
    }
}
