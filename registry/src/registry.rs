//! The Registry - immutable descriptor lookup.

use crate::ElementDescriptor;
use std::collections::HashMap;

/// The Registry provides runtime lookup of element descriptors.
/// It is immutable after construction.
#[derive(Debug, Default)]
pub struct Registry {
    /// Descriptors by type key.
    descriptors: HashMap<String, ElementDescriptor>,
    /// Type key of the plain grouping container.
    group_type: Option<String>,
    /// Type key of the swimlane pseudo-type.
    swimlane_type: Option<String>,
}

impl Registry {
    /// Create a registry (use RegistryBuilder for construction).
    pub(crate) fn new(
        descriptors: HashMap<String, ElementDescriptor>,
        group_type: Option<String>,
        swimlane_type: Option<String>,
    ) -> Self {
        Self {
            descriptors,
            group_type,
            swimlane_type,
        }
    }

    // ==================== Descriptor Lookups ====================

    /// Get the descriptor of a type.
    pub fn get_descriptor(&self, type_name: &str) -> Option<&ElementDescriptor> {
        self.descriptors.get(type_name)
    }

    /// Check if a type is known.
    pub fn contains(&self, type_name: &str) -> bool {
        self.descriptors.contains_key(type_name)
    }

    /// Get all descriptors.
    pub fn all_descriptors(&self) -> impl Iterator<Item = &ElementDescriptor> {
        self.descriptors.values()
    }

    /// Get the number of descriptors.
    pub fn descriptor_count(&self) -> usize {
        self.descriptors.len()
    }

    // ==================== Pseudo-types ====================

    /// Descriptor of the plain grouping container.
    pub fn group_descriptor(&self) -> Option<&ElementDescriptor> {
        self.group_type
            .as_deref()
            .and_then(|name| self.descriptors.get(name))
    }

    /// Descriptor of the swimlane pseudo-type.
    pub fn swimlane_descriptor(&self) -> Option<&ElementDescriptor> {
        self.swimlane_type
            .as_deref()
            .and_then(|name| self.descriptors.get(name))
    }

    // ==================== Flag Queries ====================

    /// Check if a type is the grouping container.
    pub fn is_group(&self, type_name: &str) -> bool {
        self.get_descriptor(type_name).is_some_and(|d| d.group)
    }

    /// Check if a type is a reuse type.
    pub fn is_reuse(&self, type_name: &str) -> bool {
        self.get_descriptor(type_name).is_some_and(|d| d.reuse)
    }

    /// Check if a type keeps a priority among its siblings.
    pub fn is_ordered(&self, type_name: &str) -> bool {
        self.get_descriptor(type_name)
            .is_some_and(ElementDescriptor::is_ordered)
    }

    /// Priority property of an ordered type.
    pub fn priority_property(&self, type_name: &str) -> Option<&str> {
        self.get_descriptor(type_name)
            .filter(|d| d.is_ordered())
            .and_then(|d| d.priority_property.as_deref())
    }

    /// Descriptors declaring properties that reference other elements.
    pub fn referencing_descriptors(&self) -> impl Iterator<Item = &ElementDescriptor> {
        self.descriptors
            .values()
            .filter(|d| !d.reference_properties.is_empty())
    }
}
