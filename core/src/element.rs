//! Entity structures for chains.
//!
//! Elements and dependencies are the two fundamental entity types of a chain.
//! Elements reference their parent, swimlane and incident dependencies by id;
//! ownership of every entity stays with the chain arena.

use crate::{DependencyId, ElementId, Properties, Value};
use serde::Serialize;

/// Kind-specific data of an element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementKind {
    /// A leaf element, it cannot own children.
    Plain,
    /// An element owning an ordered list of children.
    Container {
        /// Direct children in insertion order.
        children: Vec<ElementId>,
    },
    /// A lane grouping root-level elements.
    Swimlane {
        /// Root-level elements assigned to this lane.
        members: Vec<ElementId>,
        /// Whether this is the chain's default lane.
        default: bool,
        /// Whether this is the chain's reuse lane.
        reuse: bool,
    },
}

impl ElementKind {
    /// Create an empty container kind.
    pub fn container() -> Self {
        ElementKind::Container {
            children: Vec::new(),
        }
    }

    /// Create an empty swimlane kind.
    pub fn swimlane(default: bool, reuse: bool) -> Self {
        ElementKind::Swimlane {
            members: Vec::new(),
            default,
            reuse,
        }
    }
}

/// A node of the chain graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainElement {
    /// Unique identifier for this element.
    pub id: ElementId,
    /// Element type, a key into the descriptor registry.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Property values.
    pub properties: Properties,
    /// Owning container, `None` for root-level elements.
    pub parent: Option<ElementId>,
    /// Assigned swimlane.
    pub swimlane: Option<ElementId>,
    /// Dependencies ending at this element.
    pub input_dependencies: Vec<DependencyId>,
    /// Dependencies starting at this element.
    pub output_dependencies: Vec<DependencyId>,
    /// Creation time, milliseconds since Unix epoch.
    pub created_when: u64,
    /// Last modification time, milliseconds since Unix epoch.
    pub modified_when: u64,
    /// Modification counter.
    pub version: u64,
    /// Kind-specific data.
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl ChainElement {
    /// Create a new parentless element.
    pub fn new(
        id: ElementId,
        type_name: impl Into<String>,
        kind: ElementKind,
        properties: Properties,
        now: u64,
    ) -> Self {
        Self {
            id,
            type_name: type_name.into(),
            properties,
            parent: None,
            swimlane: None,
            input_dependencies: Vec::new(),
            output_dependencies: Vec::new(),
            created_when: now,
            modified_when: now,
            version: 1,
            kind,
        }
    }

    /// Returns true for container elements.
    pub fn is_container(&self) -> bool {
        matches!(self.kind, ElementKind::Container { .. })
    }

    /// Returns true for swimlane elements.
    pub fn is_swimlane(&self) -> bool {
        matches!(self.kind, ElementKind::Swimlane { .. })
    }

    /// Returns true if dependencies may touch this element.
    pub fn accepts_dependencies(&self) -> bool {
        matches!(self.kind, ElementKind::Plain)
    }

    /// Returns true if this is a root-level element.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Direct children of a container, empty for other kinds.
    pub fn children(&self) -> &[ElementId] {
        match &self.kind {
            ElementKind::Container { children } => children,
            _ => &[],
        }
    }

    /// Members of a swimlane, empty for other kinds.
    pub fn members(&self) -> &[ElementId] {
        match &self.kind {
            ElementKind::Swimlane { members, .. } => members,
            _ => &[],
        }
    }

    /// Returns true for the default swimlane.
    pub fn is_default_swimlane(&self) -> bool {
        matches!(self.kind, ElementKind::Swimlane { default: true, .. })
    }

    /// Returns true for the reuse swimlane.
    pub fn is_reuse_swimlane(&self) -> bool {
        matches!(self.kind, ElementKind::Swimlane { reuse: true, .. })
    }

    /// Get a property value by name.
    pub fn get_property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Set a property value.
    pub fn set_property(&mut self, name: impl Into<String>, value: Value) {
        self.properties.insert(name.into(), value);
    }

    /// Remove a property.
    pub fn remove_property(&mut self, name: &str) -> Option<Value> {
        self.properties.remove(name)
    }

    /// Record a modification.
    pub fn touch(&mut self, now: u64) {
        self.modified_when = now.max(self.modified_when);
        self.version += 1;
    }

    /// All incident dependencies, inputs first.
    pub fn dependencies(&self) -> impl Iterator<Item = DependencyId> + '_ {
        self.input_dependencies
            .iter()
            .chain(self.output_dependencies.iter())
            .copied()
    }
}

/// A directed dependency edge between two plain elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Dependency {
    /// Unique identifier for this dependency.
    pub id: DependencyId,
    /// Source element.
    pub from: ElementId,
    /// Target element.
    pub to: ElementId,
}

impl Dependency {
    /// Create a new dependency.
    pub fn new(id: DependencyId, from: ElementId, to: ElementId) -> Self {
        Self { id, from, to }
    }

    /// Check if this dependency touches `element_id` at either end.
    pub fn involves(&self, element_id: ElementId) -> bool {
        self.from == element_id || self.to == element_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props;

    #[test]
    fn test_element_creation() {
        let element = ChainElement::new(
            ElementId::new(1),
            "script",
            ElementKind::Plain,
            props! { "name" => "Transform" },
            100,
        );

        assert_eq!(element.id, ElementId::new(1));
        assert_eq!(element.type_name, "script");
        assert_eq!(element.version, 1);
        assert!(element.is_root());
        assert!(element.accepts_dependencies());
        assert_eq!(
            element.get_property("name"),
            Some(&Value::String("Transform".into()))
        );
    }

    #[test]
    fn test_kind_accessors() {
        let container = ChainElement::new(
            ElementId::new(1),
            "container",
            ElementKind::container(),
            props!(),
            0,
        );
        let lane = ChainElement::new(
            ElementId::new(2),
            "swimlane",
            ElementKind::swimlane(true, false),
            props!(),
            0,
        );

        assert!(container.is_container());
        assert!(!container.accepts_dependencies());
        assert!(container.members().is_empty());
        assert!(lane.is_swimlane());
        assert!(lane.is_default_swimlane());
        assert!(!lane.is_reuse_swimlane());
        assert!(lane.children().is_empty());
    }

    #[test]
    fn test_touch_bumps_version_and_keeps_time_monotonic() {
        let mut element =
            ChainElement::new(ElementId::new(1), "script", ElementKind::Plain, props!(), 50);

        element.touch(40);
        assert_eq!(element.modified_when, 50);
        assert_eq!(element.version, 2);

        element.touch(70);
        assert_eq!(element.modified_when, 70);
        assert_eq!(element.version, 3);
    }

    #[test]
    fn test_dependency_involves() {
        let dependency = Dependency::new(DependencyId::new(1), ElementId::new(1), ElementId::new(2));

        assert!(dependency.involves(ElementId::new(1)));
        assert!(dependency.involves(ElementId::new(2)));
        assert!(!dependency.involves(ElementId::new(3)));
    }
}
