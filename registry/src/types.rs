//! Descriptor definition types.

use chain_core::Properties;
use indexmap::IndexMap;
use std::fmt;

/// Multiplicity predicate over an element count.
///
/// Governs both how many children of a type a container may hold and how many
/// input dependencies an element accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Quantity {
    /// Exactly one.
    One,
    /// At least one.
    OneOrMany,
    /// At least two.
    TwoOrMany,
    /// At most one.
    ZeroOrOne,
    /// Any number.
    #[default]
    ZeroOrMany,
}

impl Quantity {
    /// Lower bound of the allowed range.
    pub fn min(&self) -> usize {
        match self {
            Quantity::One | Quantity::OneOrMany => 1,
            Quantity::TwoOrMany => 2,
            Quantity::ZeroOrOne | Quantity::ZeroOrMany => 0,
        }
    }

    /// Upper bound of the allowed range, `None` when unbounded.
    pub fn max(&self) -> Option<usize> {
        match self {
            Quantity::One | Quantity::ZeroOrOne => Some(1),
            Quantity::OneOrMany | Quantity::TwoOrMany | Quantity::ZeroOrMany => None,
        }
    }

    /// Check whether `count` satisfies the predicate.
    pub fn test(&self, count: usize) -> bool {
        !self.below_min(count) && !self.exceeds_max(count)
    }

    /// Check whether `count` is above the upper bound.
    pub fn exceeds_max(&self, count: usize) -> bool {
        self.max().is_some_and(|max| count > max)
    }

    /// Check whether `count` is under the lower bound.
    pub fn below_min(&self, count: usize) -> bool {
        count < self.min()
    }

    /// Returns true if at least one instance is required.
    pub fn is_mandatory(&self) -> bool {
        self.min() > 0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Quantity::One => "ONE",
            Quantity::OneOrMany => "ONE_OR_MANY",
            Quantity::TwoOrMany => "TWO_OR_MANY",
            Quantity::ZeroOrOne => "ZERO_OR_ONE",
            Quantity::ZeroOrMany => "ZERO_OR_MANY",
        };
        f.write_str(text)
    }
}

/// Per-type metadata consumed by the mutation engine.
#[derive(Debug, Clone)]
pub struct ElementDescriptor {
    /// Type key.
    pub name: String,
    /// Allowed parent types. Empty means unrestricted.
    pub parent_restriction: Vec<String>,
    /// Allowed child types with their multiplicities, in declaration order.
    pub allowed_children: IndexMap<String, Quantity>,
    /// Whether input dependencies are accepted.
    pub input_enabled: bool,
    /// Allowed number of input dependencies.
    pub input_quantity: Quantity,
    /// Whether output dependencies are accepted.
    pub output_enabled: bool,
    /// Whether instances own children.
    pub container: bool,
    /// Whether this is the plain grouping container.
    pub group: bool,
    /// Whether this is the swimlane pseudo-type.
    pub swimlane: bool,
    /// Whether this type is a reusable flow fragment.
    pub reuse: bool,
    /// Whether the type is deprecated.
    pub deprecated: bool,
    /// Whether the type is no longer supported by the runtime.
    pub unsupported: bool,
    /// Whether siblings of this type keep a dense priority sequence.
    pub ordered: bool,
    /// Property holding the priority of ordered elements.
    pub priority_property: Option<String>,
    /// Whether other elements may hold references to instances of this type.
    pub referenced_by_another_element: bool,
    /// Properties of this type that hold references to other elements.
    pub reference_properties: Vec<String>,
    /// Properties applied to new instances.
    pub default_properties: Properties,
}

impl ElementDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent_restriction: Vec::new(),
            allowed_children: IndexMap::new(),
            input_enabled: true,
            input_quantity: Quantity::ZeroOrMany,
            output_enabled: true,
            container: false,
            group: false,
            swimlane: false,
            reuse: false,
            deprecated: false,
            unsupported: false,
            ordered: false,
            priority_property: None,
            referenced_by_another_element: false,
            reference_properties: Vec::new(),
            default_properties: Properties::new(),
        }
    }

    /// Check whether an element of this type may live under `parent_type`.
    ///
    /// `None` stands for the root scope of the chain.
    pub fn allows_parent(&self, parent_type: Option<&str>) -> bool {
        if self.parent_restriction.is_empty() {
            return true;
        }
        parent_type.is_some_and(|parent| self.parent_restriction.iter().any(|p| p == parent))
    }

    /// Multiplicity declared for a child type.
    pub fn child_quantity(&self, child_type: &str) -> Option<Quantity> {
        self.allowed_children.get(child_type).copied()
    }

    /// Child types that must exist, with their instance counts.
    pub fn mandatory_children(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.allowed_children
            .iter()
            .filter(|(_, quantity)| quantity.is_mandatory())
            .map(|(name, quantity)| (name.as_str(), quantity.min()))
    }

    /// Returns true if instances keep a priority among siblings.
    pub fn is_ordered(&self) -> bool {
        self.ordered && self.priority_property.is_some()
    }
}
