//! RegistryBuilder for constructing an immutable Registry.

use crate::{ElementDescriptor, Quantity, Registry};
use chain_core::Value;
use regex_lite::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use thiserror::Error;

/// Type key of the builtin grouping container.
pub const GROUP_TYPE: &str = "container";

/// Type key of the builtin swimlane pseudo-type.
pub const SWIMLANE_TYPE: &str = "swimlane";

/// Errors that can occur during registry construction.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Duplicate type name: {0}")]
    DuplicateTypeName(String),

    #[error("Invalid type name: {0}")]
    InvalidTypeName(String),

    #[error("Unknown child type {child} declared on {parent}")]
    UnknownChildType { parent: String, child: String },

    #[error("Unknown parent type {parent} restricting {child}")]
    UnknownParentType { child: String, parent: String },

    #[error("Type {0} declares children but is not a container")]
    ChildrenOnLeaf(String),

    #[error("More than one {kind} type: {first} and {second}")]
    DuplicatePseudoType {
        kind: &'static str,
        first: String,
        second: String,
    },
}

fn type_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z][a-z0-9]*(-[a-z0-9]+)*$").expect("type name pattern is valid")
    })
}

/// Builder for constructing an immutable Registry.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    /// Descriptors being built.
    descriptors: HashMap<String, ElementDescriptor>,
    /// Registration order, used for deterministic validation errors.
    order: Vec<String>,
}

impl RegistryBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder seeded with the grouping container and swimlane types.
    pub fn with_builtin_types() -> Self {
        let mut builder = Self::new();
        builder.register(builtin_group());
        builder.register(builtin_swimlane());
        builder
    }

    /// Add a descriptor.
    pub fn add_type(&mut self, name: impl Into<String>) -> DescriptorBuilder<'_> {
        DescriptorBuilder {
            builder: self,
            descriptor: ElementDescriptor::new(name),
        }
    }

    /// Check if a type has been added.
    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }

    fn register(&mut self, descriptor: ElementDescriptor) {
        self.order.push(descriptor.name.clone());
        self.descriptors.insert(descriptor.name.clone(), descriptor);
    }

    /// Build the immutable Registry.
    pub fn build(self) -> Result<Registry, RegistryError> {
        let mut group_type: Option<String> = None;
        let mut swimlane_type: Option<String> = None;

        for name in &self.order {
            let descriptor = &self.descriptors[name];

            if !descriptor.allowed_children.is_empty() && !descriptor.container {
                return Err(RegistryError::ChildrenOnLeaf(name.clone()));
            }

            for child in descriptor.allowed_children.keys() {
                if !self.descriptors.contains_key(child) {
                    return Err(RegistryError::UnknownChildType {
                        parent: name.clone(),
                        child: child.clone(),
                    });
                }
            }

            for parent in &descriptor.parent_restriction {
                if !self.descriptors.contains_key(parent) {
                    return Err(RegistryError::UnknownParentType {
                        child: name.clone(),
                        parent: parent.clone(),
                    });
                }
            }

            if descriptor.group {
                claim_pseudo_type(&mut group_type, "group", name)?;
            }
            if descriptor.swimlane {
                claim_pseudo_type(&mut swimlane_type, "swimlane", name)?;
            }
        }

        Ok(Registry::new(self.descriptors, group_type, swimlane_type))
    }
}

fn claim_pseudo_type(
    slot: &mut Option<String>,
    kind: &'static str,
    name: &str,
) -> Result<(), RegistryError> {
    match slot {
        Some(first) => Err(RegistryError::DuplicatePseudoType {
            kind,
            first: first.clone(),
            second: name.to_string(),
        }),
        None => {
            *slot = Some(name.to_string());
            Ok(())
        }
    }
}

fn builtin_group() -> ElementDescriptor {
    let mut descriptor = ElementDescriptor::new(GROUP_TYPE);
    descriptor.container = true;
    descriptor.group = true;
    descriptor.input_enabled = false;
    descriptor.output_enabled = false;
    descriptor
}

fn builtin_swimlane() -> ElementDescriptor {
    let mut descriptor = ElementDescriptor::new(SWIMLANE_TYPE);
    descriptor.swimlane = true;
    descriptor.input_enabled = false;
    descriptor.output_enabled = false;
    descriptor
}

/// Builder for an element descriptor.
pub struct DescriptorBuilder<'a> {
    builder: &'a mut RegistryBuilder,
    descriptor: ElementDescriptor,
}

impl<'a> DescriptorBuilder<'a> {
    /// Restrict the allowed parent types (repeatable).
    pub fn parent(mut self, parent_type: impl Into<String>) -> Self {
        self.descriptor.parent_restriction.push(parent_type.into());
        self
    }

    /// Declare an allowed child type.
    pub fn allow_child(mut self, child_type: impl Into<String>, quantity: Quantity) -> Self {
        self.descriptor
            .allowed_children
            .insert(child_type.into(), quantity);
        self
    }

    /// Mark as a container.
    pub fn container(mut self) -> Self {
        self.descriptor.container = true;
        self.descriptor.input_enabled = false;
        self.descriptor.output_enabled = false;
        self
    }

    /// Mark as a reuse type.
    pub fn reuse(mut self) -> Self {
        self.descriptor.reuse = true;
        self
    }

    /// Mark as deprecated.
    pub fn deprecated(mut self) -> Self {
        self.descriptor.deprecated = true;
        self
    }

    /// Mark as unsupported.
    pub fn unsupported(mut self) -> Self {
        self.descriptor.unsupported = true;
        self
    }

    /// Keep a dense priority sequence in `priority_property` among siblings.
    pub fn ordered(mut self, priority_property: impl Into<String>) -> Self {
        self.descriptor.ordered = true;
        self.descriptor.priority_property = Some(priority_property.into());
        self
    }

    /// Reject input dependencies.
    pub fn input_disabled(mut self) -> Self {
        self.descriptor.input_enabled = false;
        self
    }

    /// Limit the number of input dependencies.
    pub fn input_quantity(mut self, quantity: Quantity) -> Self {
        self.descriptor.input_quantity = quantity;
        self
    }

    /// Reject output dependencies.
    pub fn output_disabled(mut self) -> Self {
        self.descriptor.output_enabled = false;
        self
    }

    /// Allow other elements to reference instances of this type.
    pub fn referenced_by_another_element(mut self) -> Self {
        self.descriptor.referenced_by_another_element = true;
        self
    }

    /// Declare a property holding a reference to another element.
    pub fn reference_property(mut self, property: impl Into<String>) -> Self {
        self.descriptor.reference_properties.push(property.into());
        self
    }

    /// Set a property applied to new instances.
    pub fn default_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.descriptor
            .default_properties
            .insert(name.into(), value.into());
        self
    }

    /// Finish building this descriptor.
    pub fn done(self) -> Result<String, RegistryError> {
        let name = self.descriptor.name.clone();

        if !type_name_pattern().is_match(&name) {
            return Err(RegistryError::InvalidTypeName(name));
        }

        if self.builder.descriptors.contains_key(&name) {
            return Err(RegistryError::DuplicateTypeName(name));
        }

        self.builder.register(self.descriptor);
        Ok(name)
    }
}
