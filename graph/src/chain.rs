//! Core chain storage implementation.
//!
//! `Chain` is an arena of elements and dependencies keyed by id. It keeps the
//! structural bookkeeping consistent (child lists, swimlane membership,
//! incident dependency lists, indexes) but enforces no business rules; those
//! live in the mutation engine.

use crate::index::{PairIndex, TypeIndex};
use chain_core::{
    ChainElement, ChainId, Dependency, DependencyId, ElementId, ElementKind, GraphError,
    GraphResult, Properties, Value,
};
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// ID allocator for elements and dependencies.
#[derive(Debug, Clone)]
struct IdAllocator {
    next_element_id: u64,
    next_dependency_id: u64,
}

impl IdAllocator {
    fn new() -> Self {
        Self {
            next_element_id: 1,
            next_dependency_id: 1,
        }
    }

    fn alloc_element_id(&mut self) -> ElementId {
        let id = ElementId::new(self.next_element_id);
        self.next_element_id += 1;
        id
    }

    fn alloc_dependency_id(&mut self) -> DependencyId {
        let id = DependencyId::new(self.next_dependency_id);
        self.next_dependency_id += 1;
        id
    }
}

/// Current wall-clock time in milliseconds since Unix epoch.
pub fn current_time_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// The in-memory chain storage.
#[derive(Debug, Clone)]
pub struct Chain {
    /// Chain identifier
    id: ChainId,
    /// Human-readable name
    name: String,
    /// Element storage
    elements: HashMap<ElementId, ChainElement>,
    /// Dependency storage
    dependencies: HashMap<DependencyId, Dependency>,
    /// ID allocator
    id_alloc: IdAllocator,
    /// Type index
    type_index: TypeIndex,
    /// Dependency pair index
    pair_index: PairIndex,
    /// The default swimlane, if created
    default_swimlane: Option<ElementId>,
    /// The reuse swimlane, if created
    reuse_swimlane: Option<ElementId>,
}

impl Chain {
    /// Create a new empty chain.
    pub fn new(id: ChainId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            elements: HashMap::new(),
            dependencies: HashMap::new(),
            id_alloc: IdAllocator::new(),
            type_index: TypeIndex::new(),
            pair_index: PairIndex::new(),
            default_swimlane: None,
            reuse_swimlane: None,
        }
    }

    /// Get the chain ID.
    pub fn id(&self) -> ChainId {
        self.id
    }

    /// Get the chain name.
    pub fn name(&self) -> &str {
        &self.name
    }

    // ==================== Element Operations ====================

    /// Save a new root-level element with the given type, kind and properties.
    ///
    /// The element has no parent and no swimlane. A default or reuse swimlane
    /// kind registers itself as the chain's structural lane.
    pub fn insert_element(
        &mut self,
        type_name: &str,
        kind: ElementKind,
        properties: Properties,
    ) -> GraphResult<ElementId> {
        if let ElementKind::Swimlane { default, reuse, .. } = &kind {
            if *default && self.default_swimlane.is_some() {
                return Err(GraphError::InvalidOperation(
                    "chain already has a default swimlane".to_string(),
                ));
            }
            if *reuse && self.reuse_swimlane.is_some() {
                return Err(GraphError::InvalidOperation(
                    "chain already has a reuse swimlane".to_string(),
                ));
            }
        }

        let id = self.id_alloc.alloc_element_id();
        let element = ChainElement::new(id, type_name, kind, properties, current_time_millis());

        if element.is_default_swimlane() {
            self.default_swimlane = Some(id);
        }
        if element.is_reuse_swimlane() {
            self.reuse_swimlane = Some(id);
        }

        self.type_index.insert(type_name, id);
        self.elements.insert(id, element);
        Ok(id)
    }

    /// Find an element by ID.
    pub fn find_by_id(&self, id: ElementId) -> Option<&ChainElement> {
        self.elements.get(&id)
    }

    /// Find a mutable element by ID.
    pub fn find_by_id_mut(&mut self, id: ElementId) -> Option<&mut ChainElement> {
        self.elements.get_mut(&id)
    }

    /// Get an element by ID or fail.
    pub fn get(&self, id: ElementId) -> GraphResult<&ChainElement> {
        self.elements.get(&id).ok_or(GraphError::ElementNotFound(id))
    }

    fn get_mut(&mut self, id: ElementId) -> GraphResult<&mut ChainElement> {
        self.elements
            .get_mut(&id)
            .ok_or(GraphError::ElementNotFound(id))
    }

    /// Check if an element exists.
    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    /// Direct children of a container, or root-level elements for `None`.
    ///
    /// Root-level elements are returned in id order and never include
    /// swimlanes.
    pub fn find_all_by_parent_id(&self, parent: Option<ElementId>) -> Vec<ElementId> {
        match parent {
            Some(parent_id) => self
                .elements
                .get(&parent_id)
                .map(|p| p.children().to_vec())
                .unwrap_or_default(),
            None => self.root_elements(),
        }
    }

    /// Root-level, non-swimlane elements in id order.
    pub fn root_elements(&self) -> Vec<ElementId> {
        let mut roots: Vec<ElementId> = self
            .elements
            .values()
            .filter(|e| e.is_root() && !e.is_swimlane())
            .map(|e| e.id)
            .collect();
        roots.sort();
        roots
    }

    /// Elements of a given type, in id order.
    pub fn elements_by_type(&self, type_name: &str) -> impl Iterator<Item = ElementId> + '_ {
        self.type_index.get(type_name)
    }

    /// All element IDs in id order.
    pub fn all_element_ids(&self) -> Vec<ElementId> {
        let mut ids: Vec<ElementId> = self.elements.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Get the number of elements, swimlanes included.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// The element and all of its descendants, in pre-order.
    pub fn subtree(&self, id: ElementId) -> GraphResult<Vec<ElementId>> {
        self.get(id)?;
        let mut result = Vec::new();
        let mut stack = vec![id];

        while let Some(current) = stack.pop() {
            result.push(current);
            if let Some(element) = self.elements.get(&current) {
                // Reverse so the first child is visited first
                stack.extend(element.children().iter().rev().copied());
            }
        }

        Ok(result)
    }

    /// Ancestors of an element, nearest first.
    pub fn ancestors(&self, id: ElementId) -> GraphResult<Vec<ElementId>> {
        let mut result = Vec::new();
        let mut current = self.get(id)?.parent;

        while let Some(parent_id) = current {
            if result.contains(&parent_id) {
                return Err(GraphError::InvalidOperation(format!(
                    "containment loop through {}",
                    parent_id
                )));
            }
            result.push(parent_id);
            current = self.get(parent_id)?.parent;
        }

        Ok(result)
    }

    /// The top-most ancestor of an element, or the element itself.
    pub fn root_of(&self, id: ElementId) -> GraphResult<ElementId> {
        Ok(self.ancestors(id)?.last().copied().unwrap_or(id))
    }

    /// Move an element under a new container, or to the root scope for `None`.
    ///
    /// The element leaves its old parent's child list (or its swimlane's member
    /// list when it was root-level) and is appended to the new parent's child
    /// list (or joins the member list of its swimlane).
    pub fn set_parent(&mut self, id: ElementId, new_parent: Option<ElementId>) -> GraphResult<()> {
        let element = self.get(id)?;
        if element.is_swimlane() {
            return Err(GraphError::InvalidOperation(format!(
                "swimlane {} cannot be nested",
                id
            )));
        }
        let old_parent = element.parent;
        let swimlane = element.swimlane;

        if let Some(parent_id) = new_parent {
            if !self.get(parent_id)?.is_container() {
                return Err(GraphError::NotAContainer(parent_id));
            }
        }

        let now = current_time_millis();

        match old_parent {
            Some(parent_id) => self.detach_child(parent_id, id, now)?,
            None => {
                if let Some(lane_id) = swimlane {
                    self.detach_member(lane_id, id, now)?;
                }
            }
        }

        match new_parent {
            Some(parent_id) => {
                let parent = self.get_mut(parent_id)?;
                if let ElementKind::Container { children } = &mut parent.kind {
                    children.push(id);
                }
                parent.touch(now);
            }
            None => {
                if let Some(lane_id) = swimlane {
                    self.attach_member(lane_id, id, now)?;
                }
            }
        }

        let element = self.get_mut(id)?;
        element.parent = new_parent;
        element.touch(now);
        Ok(())
    }

    /// Assign an element to a swimlane, or clear its lane for `None`.
    ///
    /// Root-level elements also move between the lanes' member lists.
    pub fn set_swimlane(&mut self, id: ElementId, swimlane: Option<ElementId>) -> GraphResult<()> {
        if let Some(lane_id) = swimlane {
            if !self.get(lane_id)?.is_swimlane() {
                return Err(GraphError::NotASwimlane(lane_id));
            }
        }

        let element = self.get(id)?;
        if element.is_swimlane() {
            return Err(GraphError::InvalidOperation(format!(
                "swimlane {} cannot be assigned to a swimlane",
                id
            )));
        }
        let old_lane = element.swimlane;
        let is_root = element.is_root();

        if old_lane == swimlane {
            return Ok(());
        }

        let now = current_time_millis();

        if is_root {
            if let Some(lane_id) = old_lane {
                self.detach_member(lane_id, id, now)?;
            }
            if let Some(lane_id) = swimlane {
                self.attach_member(lane_id, id, now)?;
            }
        }

        let element = self.get_mut(id)?;
        element.swimlane = swimlane;
        element.touch(now);
        Ok(())
    }

    fn detach_child(&mut self, parent_id: ElementId, child: ElementId, now: u64) -> GraphResult<()> {
        let parent = self.get_mut(parent_id)?;
        if let ElementKind::Container { children } = &mut parent.kind {
            children.retain(|c| *c != child);
        }
        parent.touch(now);
        Ok(())
    }

    fn attach_member(&mut self, lane_id: ElementId, member: ElementId, now: u64) -> GraphResult<()> {
        let lane = self.get_mut(lane_id)?;
        match &mut lane.kind {
            ElementKind::Swimlane { members, .. } => {
                if !members.contains(&member) {
                    members.push(member);
                }
            }
            _ => return Err(GraphError::NotASwimlane(lane_id)),
        }
        lane.touch(now);
        Ok(())
    }

    fn detach_member(&mut self, lane_id: ElementId, member: ElementId, now: u64) -> GraphResult<()> {
        let lane = self.get_mut(lane_id)?;
        if let ElementKind::Swimlane { members, .. } = &mut lane.kind {
            members.retain(|m| *m != member);
        }
        lane.touch(now);
        Ok(())
    }

    /// Delete an element and every dependency touching it.
    ///
    /// Containers must be emptied and swimlanes must lose their members
    /// first. Returns the removed element and its removed dependencies.
    pub fn remove_element(&mut self, id: ElementId) -> GraphResult<(ChainElement, Vec<Dependency>)> {
        let element = self.get(id)?;
        if !element.children().is_empty() {
            return Err(GraphError::InvalidOperation(format!(
                "container {} still has children",
                id
            )));
        }
        if !element.members().is_empty() {
            return Err(GraphError::InvalidOperation(format!(
                "swimlane {} still has members",
                id
            )));
        }

        let incident: Vec<DependencyId> = element.dependencies().collect();
        let parent = element.parent;
        let swimlane = element.swimlane;
        let is_swimlane = element.is_swimlane();

        let mut removed_dependencies = Vec::with_capacity(incident.len());
        for dependency_id in incident {
            // A self-referencing list entry may already be gone
            if self.dependencies.contains_key(&dependency_id) {
                removed_dependencies.push(self.remove_dependency(dependency_id)?);
            }
        }

        let now = current_time_millis();
        match parent {
            Some(parent_id) => self.detach_child(parent_id, id, now)?,
            None if !is_swimlane => {
                if let Some(lane_id) = swimlane {
                    self.detach_member(lane_id, id, now)?;
                }
            }
            None => {}
        }

        if self.default_swimlane == Some(id) {
            self.default_swimlane = None;
        }
        if self.reuse_swimlane == Some(id) {
            self.reuse_swimlane = None;
        }

        let element = self
            .elements
            .remove(&id)
            .ok_or(GraphError::ElementNotFound(id))?;
        self.type_index.remove(&element.type_name, id);

        Ok((element, removed_dependencies))
    }

    /// Set a property on an element.
    pub fn set_property(&mut self, id: ElementId, name: &str, value: Value) -> GraphResult<()> {
        let element = self.get_mut(id)?;
        element.set_property(name, value);
        element.touch(current_time_millis());
        Ok(())
    }

    /// Remove a property from an element.
    pub fn remove_property(&mut self, id: ElementId, name: &str) -> GraphResult<Option<Value>> {
        let element = self.get_mut(id)?;
        let removed = element.remove_property(name);
        if removed.is_some() {
            element.touch(current_time_millis());
        }
        Ok(removed)
    }

    // ==================== Swimlane Queries ====================

    /// The default swimlane, if any.
    pub fn default_swimlane(&self) -> Option<ElementId> {
        self.default_swimlane
    }

    /// The reuse swimlane, if any.
    pub fn reuse_swimlane(&self) -> Option<ElementId> {
        self.reuse_swimlane
    }

    /// All swimlanes in id order.
    pub fn swimlanes(&self) -> Vec<ElementId> {
        let mut lanes: Vec<ElementId> = self
            .elements
            .values()
            .filter(|e| e.is_swimlane())
            .map(|e| e.id)
            .collect();
        lanes.sort();
        lanes
    }

    /// Check if the chain has any swimlane.
    pub fn has_swimlanes(&self) -> bool {
        self.elements.values().any(ChainElement::is_swimlane)
    }

    // ==================== Dependency Operations ====================

    /// Save a new dependency and register it on both endpoints.
    pub fn insert_dependency(&mut self, from: ElementId, to: ElementId) -> GraphResult<DependencyId> {
        self.get(from)?;
        self.get(to)?;

        if self.pair_index.get(from, to).is_some() {
            return Err(GraphError::InvalidOperation(format!(
                "dependency {} -> {} already exists",
                from, to
            )));
        }

        let id = self.id_alloc.alloc_dependency_id();
        self.pair_index.insert(from, to, id);
        self.dependencies.insert(id, Dependency::new(id, from, to));

        let now = current_time_millis();
        let source = self.get_mut(from)?;
        source.output_dependencies.push(id);
        source.touch(now);
        let target = self.get_mut(to)?;
        target.input_dependencies.push(id);
        target.touch(now);

        Ok(id)
    }

    /// Find a dependency by ID.
    pub fn find_dependency(&self, id: DependencyId) -> Option<&Dependency> {
        self.dependencies.get(&id)
    }

    /// Find the dependency between two elements.
    pub fn find_dependency_between(&self, from: ElementId, to: ElementId) -> Option<DependencyId> {
        self.pair_index.get(from, to)
    }

    /// Delete a dependency and unregister it from both endpoints.
    pub fn remove_dependency(&mut self, id: DependencyId) -> GraphResult<Dependency> {
        let dependency = self
            .dependencies
            .remove(&id)
            .ok_or(GraphError::DependencyNotFound(id))?;
        self.pair_index.remove(dependency.from, dependency.to);

        let now = current_time_millis();
        if let Some(source) = self.elements.get_mut(&dependency.from) {
            source.output_dependencies.retain(|d| *d != id);
            source.touch(now);
        }
        if let Some(target) = self.elements.get_mut(&dependency.to) {
            target.input_dependencies.retain(|d| *d != id);
            target.touch(now);
        }

        Ok(dependency)
    }

    /// Elements reached through the output dependencies of `id`.
    pub fn successors(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        self.elements
            .get(&id)
            .into_iter()
            .flat_map(|e| e.output_dependencies.iter())
            .filter_map(|d| self.dependencies.get(d))
            .map(|d| d.to)
    }

    /// Get the number of dependencies.
    pub fn dependency_count(&self) -> usize {
        self.dependencies.len()
    }

    /// All dependencies in id order.
    pub fn all_dependencies(&self) -> Vec<Dependency> {
        let mut all: Vec<Dependency> = self.dependencies.values().copied().collect();
        all.sort_by_key(|d| d.id);
        all
    }
}
