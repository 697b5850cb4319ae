//! Chain editor - coordinates mutation operations.
//!
//! The editor delegates to the service modules in `ops/`:
//! - `ops/element.rs` - create, delete, group, ungroup, clone, change parent
//! - `ops/dependency.rs` - dependency creation with adoption, deletion
//! - `ops/ordering.rs` - sibling priorities
//! - `ops/swimlane.rs` - swimlane creation, transfer, deletion
//!
//! Every mutating call is atomic: on failure the chain is restored to the
//! state it had before the call.

use chain_core::{ChainId, DependencyId, ElementId};
use chain_graph::Chain;
use chain_registry::Registry;
use log::{debug, warn};

use crate::config::EngineConfig;
use crate::diff::ChainDiff;
use crate::error::{MutationError, MutationResult};
use crate::ops::{dependency, element, ordering, swimlane};
use crate::result::MutationOutcome;

/// Mutation entry point for one chain.
pub struct ChainEditor<'r, 'c> {
    registry: &'r Registry,
    chain: &'c mut Chain,
    config: EngineConfig,
}

impl<'r, 'c> ChainEditor<'r, 'c> {
    /// Create a new editor with the default configuration.
    pub fn new(registry: &'r Registry, chain: &'c mut Chain) -> Self {
        Self::with_config(registry, chain, EngineConfig::default())
    }

    /// Create a new editor.
    pub fn with_config(registry: &'r Registry, chain: &'c mut Chain, config: EngineConfig) -> Self {
        Self {
            registry,
            chain,
            config,
        }
    }

    pub fn chain(&self) -> &Chain {
        self.chain
    }

    pub fn registry(&self) -> &Registry {
        self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run `operation` against the chain, restoring it if the operation fails.
    fn atomically<T>(
        &mut self,
        name: &'static str,
        operation: impl FnOnce(&Registry, &mut Chain, &EngineConfig, &mut ChainDiff) -> MutationResult<T>,
    ) -> MutationResult<MutationOutcome<T>> {
        let snapshot = self.config.rollback_on_error.then(|| self.chain.clone());
        let mut diff = ChainDiff::new();

        match operation(self.registry, self.chain, &self.config, &mut diff) {
            Ok(value) => {
                diff.refresh(self.chain);
                debug!(operation = name, empty = diff.is_empty(); "Mutation applied");
                Ok(MutationOutcome::new(value, diff))
            }
            Err(e) => {
                if let Some(snapshot) = snapshot {
                    warn!(operation = name, error:% = e; "Mutation failed, restoring chain");
                    *self.chain = snapshot;
                }
                Err(e)
            }
        }
    }

    fn diff_only(
        &mut self,
        name: &'static str,
        operation: impl FnOnce(&Registry, &mut Chain, &EngineConfig, &mut ChainDiff) -> MutationResult<()>,
    ) -> MutationResult<ChainDiff> {
        self.atomically(name, operation).map(|outcome| outcome.diff)
    }

    // ==================== Elements ====================

    /// Create an element, with its mandatory children.
    pub fn create_element(
        &mut self,
        type_name: &str,
        parent: Option<ElementId>,
        swimlane: Option<ElementId>,
    ) -> MutationResult<MutationOutcome<ElementId>> {
        self.atomically("create_element", |registry, chain, config, diff| {
            element::create(registry, chain, config, type_name, parent, swimlane, diff)
        })
    }

    /// Delete an element with its descendants and dependencies.
    pub fn delete_element(&mut self, id: ElementId) -> MutationResult<ChainDiff> {
        self.diff_only("delete_element", |registry, chain, _, diff| {
            element::delete_by_id(registry, chain, id, diff)
        })
    }

    /// Wrap root-level elements in a new group container.
    pub fn group(&mut self, ids: &[ElementId]) -> MutationResult<MutationOutcome<ElementId>> {
        self.atomically("group", |registry, chain, config, diff| {
            element::group(registry, chain, config, ids, diff)
        })
    }

    /// Dissolve a group container, returning its former children.
    pub fn ungroup(&mut self, id: ElementId) -> MutationResult<MutationOutcome<Vec<ElementId>>> {
        self.atomically("ungroup", |registry, chain, config, diff| {
            element::ungroup(registry, chain, config, id, diff)
        })
    }

    /// Deep-copy an element under `parent`, or at the root.
    pub fn clone_element(
        &mut self,
        id: ElementId,
        parent: Option<ElementId>,
    ) -> MutationResult<MutationOutcome<ElementId>> {
        self.atomically("clone_element", |registry, chain, config, diff| {
            element::clone(registry, chain, config, id, parent, diff)
        })
    }

    /// Move an element under another container, or to the root.
    pub fn change_parent(
        &mut self,
        id: ElementId,
        parent: Option<ElementId>,
    ) -> MutationResult<ChainDiff> {
        self.diff_only("change_parent", |registry, chain, config, diff| {
            element::change_parent(registry, chain, config, id, parent, diff)
        })
    }

    // ==================== Dependencies ====================

    /// Connect two elements.
    pub fn create_dependency(
        &mut self,
        from: ElementId,
        to: ElementId,
    ) -> MutationResult<MutationOutcome<DependencyId>> {
        self.atomically("create_dependency", |registry, chain, config, diff| {
            dependency::create(registry, chain, config, from, to, diff)
        })
    }

    pub fn delete_dependency(&mut self, id: DependencyId) -> MutationResult<ChainDiff> {
        self.diff_only("delete_dependency", |_, chain, _, diff| {
            dependency::delete_by_id(chain, id, diff)
        })
    }

    pub fn delete_dependencies(&mut self, ids: &[DependencyId]) -> MutationResult<ChainDiff> {
        self.diff_only("delete_dependencies", |_, chain, _, diff| {
            dependency::delete_all_by_ids(chain, ids, diff)
        })
    }

    // ==================== Ordering ====================

    pub fn is_ordered(&self, id: ElementId) -> MutationResult<bool> {
        let element = self
            .chain
            .find_by_id(id)
            .ok_or(MutationError::ElementNotFound(id))?;
        Ok(ordering::is_ordered(self.registry, element))
    }

    /// Priority a new ordered element would take under `parent`.
    pub fn calculate_priority(
        &self,
        parent: Option<ElementId>,
        id: ElementId,
    ) -> MutationResult<Option<i64>> {
        ordering::calculate_priority(self.registry, self.chain, parent, id)
    }

    pub fn change_priority(
        &mut self,
        parent: Option<ElementId>,
        id: ElementId,
        priority: i64,
    ) -> MutationResult<ChainDiff> {
        self.diff_only("change_priority", |registry, chain, _, diff| {
            ordering::change_priority(registry, chain, parent, id, priority, diff)
        })
    }

    pub fn remove_ordered_element(
        &mut self,
        parent: Option<ElementId>,
        id: ElementId,
    ) -> MutationResult<ChainDiff> {
        self.diff_only("remove_ordered_element", |registry, chain, _, diff| {
            ordering::remove_ordered_element(registry, chain, parent, id, diff)
        })
    }

    // ==================== Swimlanes ====================

    pub fn create_swimlane(&mut self, chain_id: ChainId) -> MutationResult<MutationOutcome<ElementId>> {
        self.atomically("create_swimlane", |registry, chain, config, diff| {
            swimlane::create(registry, chain, config, chain_id, diff)
        })
    }

    pub fn transfer_element_to_swimlane(
        &mut self,
        swimlane: Option<ElementId>,
        id: ElementId,
    ) -> MutationResult<ChainDiff> {
        self.diff_only("transfer_element_to_swimlane", |registry, chain, _, diff| {
            swimlane::transfer_element_to_swimlane(registry, chain, swimlane, id, diff)
        })
    }

    pub fn delete_swimlane(&mut self, id: ElementId) -> MutationResult<ChainDiff> {
        self.diff_only("delete_swimlane", |registry, chain, _, diff| {
            swimlane::delete(registry, chain, id, diff)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_core::Value;
    use chain_registry::{Quantity, RegistryBuilder};

    fn test_registry() -> Registry {
        let mut builder = RegistryBuilder::with_builtin_types();
        builder.add_type("script").done().unwrap();
        builder.add_type("catch").parent("try-catch").done().unwrap();
        builder
            .add_type("try-catch")
            .container()
            .allow_child("catch", Quantity::One)
            .done()
            .unwrap();
        builder.build().unwrap()
    }

    // ========== TEST: failed_call_restores_chain ==========
    #[test]
    fn test_failed_call_restores_chain() {
        // GIVEN a try-catch holding its single mandatory catch
        let registry = test_registry();
        let mut chain = Chain::new(ChainId::new(1), "c");
        let mut editor = ChainEditor::new(&registry, &mut chain);
        let block = editor.create_element("try-catch", None, None).unwrap().value;
        let before = editor.chain().element_count();

        // WHEN a second catch is created
        let err = editor.create_element("catch", Some(block), None).unwrap_err();

        // THEN the chain is unchanged
        assert!(err.is_validation());
        assert_eq!(editor.chain().element_count(), before);
    }

    // ========== TEST: rollback_restores_partial_work ==========
    #[test]
    fn test_rollback_restores_partial_work() {
        // GIVEN a root script in the default swimlane
        let registry = test_registry();
        let mut chain = Chain::new(ChainId::new(1), "c");
        let mut editor = ChainEditor::new(&registry, &mut chain);
        let a = editor.create_element("script", None, None).unwrap().value;
        editor.create_swimlane(ChainId::new(1)).unwrap();

        // WHEN the operation fails after mutating
        let err = editor
            .atomically("test", |registry, chain, config, diff| {
                element::create(registry, chain, config, "script", None, None, diff)?;
                element::delete_by_id(registry, chain, ElementId::new(99), diff)
            })
            .unwrap_err();

        // THEN nothing survives
        assert!(err.is_not_found());
        assert_eq!(editor.chain().root_elements(), vec![a]);
    }

    // ========== TEST: disabled_rollback_leaves_partial_work ==========
    #[test]
    fn test_disabled_rollback_leaves_partial_work() {
        // GIVEN an editor whose caller owns the transaction
        let registry = test_registry();
        let mut chain = Chain::new(ChainId::new(1), "c");
        let config = EngineConfig::default().with_rollback_on_error(false);
        let mut editor = ChainEditor::with_config(&registry, &mut chain, config);
        let a = editor.create_element("script", None, None).unwrap().value;

        // WHEN the operation fails after mutating
        let err = editor
            .atomically("test", |registry, chain, config, diff| {
                element::create(registry, chain, config, "script", None, None, diff)?;
                element::delete_by_id(registry, chain, ElementId::new(99), diff)
            })
            .unwrap_err();

        // THEN the partial work stays for the caller to roll back
        assert!(err.is_not_found());
        assert_eq!(editor.chain().root_elements().len(), 2);
        assert!(editor.chain().root_elements().contains(&a));
    }

    // ========== TEST: diff_reflects_final_state ==========
    #[test]
    fn test_diff_reflects_final_state() {
        let registry = test_registry();
        let mut chain = Chain::new(ChainId::new(1), "c");
        let mut editor = ChainEditor::new(&registry, &mut chain);

        let outcome = editor.create_element("try-catch", None, None).unwrap();

        let block = outcome.diff.element(outcome.value).unwrap();
        assert_eq!(block.children().len(), 1);
        assert_eq!(
            editor.chain().get(outcome.value).unwrap().children(),
            block.children()
        );
        assert!(editor.is_ordered(outcome.value).is_ok_and(|o| !o));
    }

    #[test]
    fn test_swimlane_names_follow_config() {
        let registry = test_registry();
        let mut chain = Chain::new(ChainId::new(1), "c");
        let config = EngineConfig::default().with_default_swimlane_name("Main");
        let mut editor = ChainEditor::with_config(&registry, &mut chain, config);

        let lane = editor.create_swimlane(ChainId::new(1)).unwrap().value;

        assert_eq!(
            editor.chain().get(lane).unwrap().get_property("name"),
            Some(&Value::from("Main"))
        );
    }
}
