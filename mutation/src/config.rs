//! Engine configuration.

use serde::Deserialize;

/// Settings of the mutation engine.
///
/// Every field falls back to its default when absent, so partial documents
/// deserialize cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Name given to the default swimlane
    pub default_swimlane_name: String,

    /// Name given to the reuse swimlane
    pub reuse_swimlane_name: String,

    /// Name given to plain swimlanes
    pub swimlane_name: String,

    /// Property receiving swimlane names
    pub name_property: String,

    /// Restore the chain when an operation fails part-way.
    ///
    /// Turn this off only when the caller wraps every call in its own
    /// transaction and rolls that back on error, since a failed call then
    /// leaves its partial changes in the chain.
    pub rollback_on_error: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_swimlane_name: "Default swimlane".to_string(),
            reuse_swimlane_name: "Reuse swimlane".to_string(),
            swimlane_name: "Swimlane".to_string(),
            name_property: "name".to_string(),
            rollback_on_error: true,
        }
    }
}

impl EngineConfig {
    pub fn with_default_swimlane_name(mut self, name: impl Into<String>) -> Self {
        self.default_swimlane_name = name.into();
        self
    }

    pub fn with_reuse_swimlane_name(mut self, name: impl Into<String>) -> Self {
        self.reuse_swimlane_name = name.into();
        self
    }

    pub fn with_swimlane_name(mut self, name: impl Into<String>) -> Self {
        self.swimlane_name = name.into();
        self
    }

    pub fn with_name_property(mut self, property: impl Into<String>) -> Self {
        self.name_property = property.into();
        self
    }

    pub fn with_rollback_on_error(mut self, enabled: bool) -> Self {
        self.rollback_on_error = enabled;
        self
    }
}
