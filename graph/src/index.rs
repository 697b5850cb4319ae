//! Indexes for efficient chain lookups.

use chain_core::{DependencyId, ElementId};
use std::collections::{BTreeSet, HashMap};

/// Type index: type key -> Set<ElementId>
#[derive(Debug, Clone, Default)]
pub struct TypeIndex {
    index: HashMap<String, BTreeSet<ElementId>>,
}

impl TypeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, type_name: &str, element_id: ElementId) {
        self.index
            .entry(type_name.to_string())
            .or_default()
            .insert(element_id);
    }

    pub fn remove(&mut self, type_name: &str, element_id: ElementId) {
        if let Some(set) = self.index.get_mut(type_name) {
            set.remove(&element_id);
            if set.is_empty() {
                self.index.remove(type_name);
            }
        }
    }

    pub fn get(&self, type_name: &str) -> impl Iterator<Item = ElementId> + '_ {
        self.index
            .get(type_name)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }
}

/// Pair index: (from, to) -> DependencyId
///
/// At most one dependency exists per ordered pair.
#[derive(Debug, Clone, Default)]
pub struct PairIndex {
    index: HashMap<(ElementId, ElementId), DependencyId>,
}

impl PairIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pair. Returns false if the pair is already taken.
    pub fn insert(&mut self, from: ElementId, to: ElementId, dependency_id: DependencyId) -> bool {
        match self.index.entry((from, to)) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(dependency_id);
                true
            }
        }
    }

    pub fn remove(&mut self, from: ElementId, to: ElementId) {
        self.index.remove(&(from, to));
    }

    pub fn get(&self, from: ElementId, to: ElementId) -> Option<DependencyId> {
        self.index.get(&(from, to)).copied()
    }
}
