//! Change accumulation for chain mutations.

use chain_core::{ChainElement, Dependency, DependencyId, ElementId};
use chain_graph::Chain;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

/// The net effect of one mutation on a chain.
///
/// Entries are keyed by id and keep first-touch order. An element created and
/// removed within the same mutation leaves no trace, a created element absorbs
/// later updates, and updates of the same element collapse to the last
/// snapshot. The empty diff is the identity of [`ChainDiff::merge`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainDiff {
    #[serde(serialize_with = "values")]
    created_elements: IndexMap<ElementId, ChainElement>,
    #[serde(serialize_with = "values")]
    updated_elements: IndexMap<ElementId, ChainElement>,
    #[serde(serialize_with = "values")]
    removed_elements: IndexMap<ElementId, ChainElement>,
    #[serde(serialize_with = "values")]
    created_dependencies: IndexMap<DependencyId, Dependency>,
    #[serde(serialize_with = "values")]
    removed_dependencies: IndexMap<DependencyId, Dependency>,
}

fn values<K, V: Serialize, S: Serializer>(
    map: &IndexMap<K, V>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(map.values())
}

impl ChainDiff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new element.
    pub fn add_created_element(&mut self, element: ChainElement) {
        self.updated_elements.shift_remove(&element.id);
        self.created_elements.insert(element.id, element);
    }

    /// Record a modified element.
    pub fn add_updated_element(&mut self, element: ChainElement) {
        if self.removed_elements.contains_key(&element.id) {
            return;
        }
        if let Some(created) = self.created_elements.get_mut(&element.id) {
            *created = element;
            return;
        }
        self.updated_elements.insert(element.id, element);
    }

    /// Record a deleted element.
    pub fn add_removed_element(&mut self, element: ChainElement) {
        self.updated_elements.shift_remove(&element.id);
        if self.created_elements.shift_remove(&element.id).is_some() {
            return;
        }
        self.removed_elements.insert(element.id, element);
    }

    /// Record several deleted elements.
    pub fn add_removed_elements(&mut self, elements: impl IntoIterator<Item = ChainElement>) {
        for element in elements {
            self.add_removed_element(element);
        }
    }

    /// Record a new dependency.
    pub fn add_created_dependency(&mut self, dependency: Dependency) {
        self.created_dependencies.insert(dependency.id, dependency);
    }

    /// Record a deleted dependency.
    pub fn add_removed_dependency(&mut self, dependency: Dependency) {
        if self.created_dependencies.shift_remove(&dependency.id).is_some() {
            return;
        }
        self.removed_dependencies.insert(dependency.id, dependency);
    }

    /// Fold a later diff into this one.
    pub fn merge(&mut self, other: ChainDiff) {
        for (_, element) in other.created_elements {
            self.add_created_element(element);
        }
        for (_, element) in other.updated_elements {
            self.add_updated_element(element);
        }
        for (_, element) in other.removed_elements {
            self.add_removed_element(element);
        }
        for (_, dependency) in other.created_dependencies {
            self.add_created_dependency(dependency);
        }
        for (_, dependency) in other.removed_dependencies {
            self.add_removed_dependency(dependency);
        }
    }

    /// Re-snapshot created and updated elements from the chain's final state.
    ///
    /// Entries whose element no longer exists are dropped.
    pub fn refresh(&mut self, chain: &Chain) {
        for map in [&mut self.created_elements, &mut self.updated_elements] {
            map.retain(|id, snapshot| match chain.find_by_id(*id) {
                Some(current) => {
                    *snapshot = current.clone();
                    true
                }
                None => false,
            });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.created_elements.is_empty()
            && self.updated_elements.is_empty()
            && self.removed_elements.is_empty()
            && self.created_dependencies.is_empty()
            && self.removed_dependencies.is_empty()
    }

    pub fn created_elements(&self) -> impl Iterator<Item = &ChainElement> {
        self.created_elements.values()
    }

    pub fn updated_elements(&self) -> impl Iterator<Item = &ChainElement> {
        self.updated_elements.values()
    }

    pub fn removed_elements(&self) -> impl Iterator<Item = &ChainElement> {
        self.removed_elements.values()
    }

    pub fn created_dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.created_dependencies.values()
    }

    pub fn removed_dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.removed_dependencies.values()
    }

    pub fn is_created(&self, id: ElementId) -> bool {
        self.created_elements.contains_key(&id)
    }

    pub fn is_updated(&self, id: ElementId) -> bool {
        self.updated_elements.contains_key(&id)
    }

    pub fn is_removed(&self, id: ElementId) -> bool {
        self.removed_elements.contains_key(&id)
    }

    /// Snapshot of a created or updated element.
    pub fn element(&self, id: ElementId) -> Option<&ChainElement> {
        self.created_elements
            .get(&id)
            .or_else(|| self.updated_elements.get(&id))
    }
}
