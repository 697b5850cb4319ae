//! Element operations - creation, deletion, grouping, cloning and moves.

use chain_core::{messages, ElementId, ElementKind};
use chain_graph::Chain;
use chain_registry::{ElementDescriptor, Registry};
use log::{debug, trace};
use std::collections::{HashSet, VecDeque};

use super::{mark_updated, ordering, swimlane};
use crate::config::EngineConfig;
use crate::diff::ChainDiff;
use crate::error::{MutationError, MutationResult};
use crate::validation;

/// Create an element of `type_name` under `parent`, or at the root.
///
/// A requested swimlane only applies to root-level elements; nested elements
/// follow their parent's lane. Mandatory children are created along with
/// containers.
pub fn create(
    registry: &Registry,
    chain: &mut Chain,
    config: &EngineConfig,
    type_name: &str,
    parent: Option<ElementId>,
    requested_swimlane: Option<ElementId>,
    diff: &mut ChainDiff,
) -> MutationResult<ElementId> {
    let descriptor = validation::descriptor(registry, type_name)?;
    if descriptor.swimlane {
        return Err(MutationError::validation(messages::ERR_SWIMLANE_AS_ELEMENT));
    }

    let lane = match parent {
        Some(parent_id) => {
            let parent = validation::container(chain, parent_id)?;
            validation::check_parent_restriction(descriptor, Some(parent))?;
            validation::check_child_cap(registry, chain, parent, type_name, 1)?;
            parent.swimlane
        }
        None => {
            validation::check_parent_restriction(descriptor, None)?;
            swimlane::resolve_root_swimlane(
                registry,
                chain,
                config,
                registry.is_reuse(type_name),
                requested_swimlane,
                diff,
            )?
        }
    };

    let id = place(registry, chain, descriptor, parent, lane, diff)?;
    create_mandatory_children(registry, chain, id, diff)?;

    debug!(element_id:% = id, type_name, parent:? = parent; "Created element");
    Ok(id)
}

/// Insert a new element and attach it to its parent and lane.
fn place(
    registry: &Registry,
    chain: &mut Chain,
    descriptor: &ElementDescriptor,
    parent: Option<ElementId>,
    lane: Option<ElementId>,
    diff: &mut ChainDiff,
) -> MutationResult<ElementId> {
    let kind = if descriptor.container {
        ElementKind::container()
    } else {
        ElementKind::Plain
    };
    let id = chain.insert_element(&descriptor.name, kind, descriptor.default_properties.clone())?;

    if parent.is_some() {
        chain.set_parent(id, parent)?;
    }
    if lane.is_some() {
        chain.set_swimlane(id, lane)?;
    }
    ordering::assign_priority(registry, chain, id, diff)?;

    diff.add_created_element(chain.get(id)?.clone());
    match (parent, lane) {
        (Some(parent_id), _) => mark_updated(chain, diff, parent_id),
        (None, Some(lane_id)) => mark_updated(chain, diff, lane_id),
        (None, None) => {}
    }
    Ok(id)
}

fn create_mandatory_children(
    registry: &Registry,
    chain: &mut Chain,
    root: ElementId,
    diff: &mut ChainDiff,
) -> MutationResult<()> {
    let mut worklist = vec![root];

    while let Some(container_id) = worklist.pop() {
        let container = chain.get(container_id)?;
        if !container.is_container() {
            continue;
        }
        let lane = container.swimlane;
        let parent_descriptor = validation::descriptor(registry, &container.type_name)?;

        for (child_type, count) in parent_descriptor.mandatory_children() {
            let child_descriptor = validation::descriptor(registry, child_type)?;
            if child_descriptor.deprecated && !parent_descriptor.deprecated {
                trace!(child_type; "Skipping deprecated mandatory child");
                continue;
            }
            for _ in 0..count {
                let child = place(
                    registry,
                    chain,
                    child_descriptor,
                    Some(container_id),
                    lane,
                    diff,
                )?;
                trace!(element_id:% = child, child_type; "Created mandatory child");
                if child_descriptor.container {
                    worklist.push(child);
                }
            }
        }
    }
    Ok(())
}

/// Delete an element with its descendants and every dependency touching them.
pub fn delete_by_id(
    registry: &Registry,
    chain: &mut Chain,
    id: ElementId,
    diff: &mut ChainDiff,
) -> MutationResult<()> {
    let element = chain
        .find_by_id(id)
        .ok_or(MutationError::ElementNotFound(id))?;
    if element.is_swimlane() {
        return Err(MutationError::validation(messages::ERR_SWIMLANE_AS_ELEMENT));
    }
    let parent = element.parent;
    let lane = element.swimlane;

    if let Some(parent_id) = parent {
        let parent_element = chain.get(parent_id)?;
        validation::check_child_floor(registry, chain, parent_element, &element.type_name)?;
    }

    ordering::remove_ordered_element(registry, chain, parent, id, diff)?;

    let collected = chain.subtree(id)?;
    let referenced: Vec<ElementId> = collected
        .iter()
        .copied()
        .filter(|x| {
            chain
                .find_by_id(*x)
                .and_then(|e| registry.get_descriptor(&e.type_name))
                .is_some_and(|d| d.referenced_by_another_element)
        })
        .collect();

    // Leaves first, so every container is empty when its turn comes
    let mut removed = Vec::with_capacity(collected.len());
    for element_id in collected.iter().rev() {
        let (element, dependencies) = chain.remove_element(*element_id)?;
        for dependency in dependencies {
            mark_updated(chain, diff, dependency.from);
            mark_updated(chain, diff, dependency.to);
            diff.add_removed_dependency(dependency);
        }
        removed.push(element);
    }
    diff.add_removed_elements(removed.into_iter().rev());

    clear_references(registry, chain, &referenced, diff)?;

    match (parent, lane) {
        (Some(parent_id), _) => mark_updated(chain, diff, parent_id),
        (None, Some(lane_id)) => mark_updated(chain, diff, lane_id),
        (None, None) => {}
    }

    debug!(element_id:% = id, removed = collected.len(); "Deleted element");
    Ok(())
}

/// Drop references to deleted elements.
///
/// List properties lose only the dead items and disappear once empty.
fn clear_references(
    registry: &Registry,
    chain: &mut Chain,
    referenced: &[ElementId],
    diff: &mut ChainDiff,
) -> MutationResult<()> {
    if referenced.is_empty() {
        return Ok(());
    }

    for descriptor in registry.referencing_descriptors() {
        let holders: Vec<ElementId> = chain.elements_by_type(&descriptor.name).collect();
        for holder in holders {
            for property in &descriptor.reference_properties {
                let pruned = match chain.get(holder)?.get_property(property) {
                    Some(value) if referenced.iter().any(|r| value.references(*r)) => {
                        value.without_references(referenced)
                    }
                    _ => continue,
                };
                trace!(element_id:% = holder, property = property.as_str(); "Clearing reference");
                match pruned {
                    Some(value) => chain.set_property(holder, property, value)?,
                    None => {
                        chain.remove_property(holder, property)?;
                    }
                }
                mark_updated(chain, diff, holder);
            }
        }
    }
    Ok(())
}

/// Wrap parentless elements in a new group container.
///
/// The group takes the swimlane of the first element.
pub fn group(
    registry: &Registry,
    chain: &mut Chain,
    config: &EngineConfig,
    ids: &[ElementId],
    diff: &mut ChainDiff,
) -> MutationResult<ElementId> {
    if ids.is_empty() {
        return Err(MutationError::validation(messages::ERR_EMPTY_GROUP));
    }

    let mut seen = HashSet::new();
    let targets: Vec<ElementId> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();

    for id in &targets {
        let element = chain
            .find_by_id(*id)
            .ok_or(MutationError::ElementNotFound(*id))?;
        if element.is_swimlane() {
            return Err(MutationError::validation(messages::ERR_SWIMLANE_AS_ELEMENT));
        }
        if let Some(parent) = element.parent {
            return Err(MutationError::illegal_state(format!(
                "Element {} already belongs to container {}",
                id, parent
            )));
        }
    }

    let descriptor = registry
        .group_descriptor()
        .ok_or_else(|| MutationError::illegal_state("No group container type is registered"))?;
    validation::check_parent_restriction(descriptor, None)?;

    let lane = chain.get(targets[0])?.swimlane;
    let group_id = place(registry, chain, descriptor, None, lane, diff)?;

    for id in &targets {
        relocate(registry, chain, config, *id, Some(group_id), diff)?;
    }

    debug!(group_id:% = group_id, elements = targets.len(); "Grouped elements");
    Ok(group_id)
}

/// Release the children of a group container to the root and delete it.
///
/// Returns the released children.
pub fn ungroup(
    registry: &Registry,
    chain: &mut Chain,
    config: &EngineConfig,
    container_id: ElementId,
    diff: &mut ChainDiff,
) -> MutationResult<Vec<ElementId>> {
    let container = chain
        .find_by_id(container_id)
        .ok_or(MutationError::ElementNotFound(container_id))?;
    if !container.is_container() || !registry.is_group(&container.type_name) {
        return Err(MutationError::illegal_state(format!(
            "Element {} is not a group container",
            container_id
        )));
    }
    let children = container.children().to_vec();
    let parent = container.parent;
    let lane = container.swimlane;

    for child in &children {
        relocate(registry, chain, config, *child, None, diff)?;
    }

    let (removed, _) = chain.remove_element(container_id)?;
    diff.add_removed_element(removed);
    match (parent, lane) {
        (Some(parent_id), _) => mark_updated(chain, diff, parent_id),
        (None, Some(lane_id)) => mark_updated(chain, diff, lane_id),
        (None, None) => {}
    }

    debug!(group_id:% = container_id, released = children.len(); "Ungrouped elements");
    Ok(children)
}

/// Deep-copy an element and its descendants under `parent`, or at the root.
///
/// Copies get new ids, the same types and properties and the same nesting.
/// Dependencies are not copied.
pub fn clone(
    registry: &Registry,
    chain: &mut Chain,
    config: &EngineConfig,
    source_id: ElementId,
    parent: Option<ElementId>,
    diff: &mut ChainDiff,
) -> MutationResult<ElementId> {
    let source = chain
        .find_by_id(source_id)
        .ok_or(MutationError::ElementNotFound(source_id))?;
    if source.is_swimlane() {
        return Err(MutationError::validation(messages::ERR_SWIMLANE_AS_ELEMENT));
    }
    let type_name = source.type_name.clone();
    let source_lane = source.is_root().then_some(source.swimlane).flatten();
    let descriptor = validation::descriptor(registry, &type_name)?;

    let lane = match parent {
        Some(parent_id) => {
            let parent = validation::container(chain, parent_id)?;
            validation::check_parent_restriction(descriptor, Some(parent))?;
            validation::check_child_cap(registry, chain, parent, &type_name, 1)?;
            parent.swimlane
        }
        None => {
            validation::check_parent_restriction(descriptor, None)?;
            let reuse = swimlane::reuse_anchor(registry, chain, source_id)?.is_some();
            swimlane::root_swimlane_for(registry, chain, config, reuse, source_lane, diff)?
        }
    };

    let originals: HashSet<ElementId> = chain.subtree(source_id)?.into_iter().collect();
    let mut queue = VecDeque::from([(source_id, parent)]);
    let mut clone_root = None;

    while let Some((original_id, target_parent)) = queue.pop_front() {
        let original = chain.get(original_id)?;
        let kind = if original.is_container() {
            ElementKind::container()
        } else {
            ElementKind::Plain
        };
        let type_name = original.type_name.clone();
        let properties = original.properties.clone();
        let children: Vec<ElementId> = original
            .children()
            .iter()
            .copied()
            .filter(|c| originals.contains(c))
            .collect();

        let copy = chain.insert_element(&type_name, kind, properties)?;
        if target_parent.is_some() {
            chain.set_parent(copy, target_parent)?;
        }
        if lane.is_some() {
            chain.set_swimlane(copy, lane)?;
        }
        if clone_root.is_none() {
            clone_root = Some(copy);
            ordering::assign_priority(registry, chain, copy, diff)?;
        }
        diff.add_created_element(chain.get(copy)?.clone());
        trace!(source_id:% = original_id, element_id:% = copy; "Cloned element");

        queue.extend(children.into_iter().map(|child| (child, Some(copy))));
    }

    let clone_root = clone_root.ok_or(MutationError::ElementNotFound(source_id))?;
    match (parent, lane) {
        (Some(parent_id), _) => mark_updated(chain, diff, parent_id),
        (None, Some(lane_id)) => mark_updated(chain, diff, lane_id),
        (None, None) => {}
    }

    debug!(source_id:% = source_id, element_id:% = clone_root; "Cloned subtree");
    Ok(clone_root)
}

/// Move an element and its subtree under another container, or to the root.
pub fn change_parent(
    registry: &Registry,
    chain: &mut Chain,
    config: &EngineConfig,
    id: ElementId,
    new_parent: Option<ElementId>,
    diff: &mut ChainDiff,
) -> MutationResult<()> {
    let element = chain
        .find_by_id(id)
        .ok_or(MutationError::ElementNotFound(id))?;
    if element.is_swimlane() {
        return Err(MutationError::validation(messages::ERR_SWIMLANE_AS_ELEMENT));
    }
    if element.parent == new_parent {
        return Ok(());
    }
    let descriptor = validation::descriptor(registry, &element.type_name)?;

    match new_parent {
        Some(parent_id) => {
            let parent = validation::container(chain, parent_id)?;
            if chain.subtree(id)?.contains(&parent_id) {
                return Err(MutationError::validation(format!(
                    "Element {} cannot be moved into its own subtree",
                    id
                )));
            }
            validation::check_parent_restriction(descriptor, Some(parent))?;
            validation::check_child_cap(registry, chain, parent, &element.type_name, 1)?;
        }
        None => validation::check_parent_restriction(descriptor, None)?,
    }

    if let Some(old_parent) = element.parent {
        let old_parent = chain.get(old_parent)?;
        validation::check_child_floor(registry, chain, old_parent, &element.type_name)?;
    }

    relocate(registry, chain, config, id, new_parent, diff)?;
    debug!(element_id:% = id, parent:? = new_parent; "Changed parent");
    Ok(())
}

/// Re-parent an element without business checks.
///
/// Keeps priorities dense on both sides and moves the subtree into the new
/// parent's lane. Elements moved to the root keep their lane when allowed.
pub(crate) fn relocate(
    registry: &Registry,
    chain: &mut Chain,
    config: &EngineConfig,
    id: ElementId,
    new_parent: Option<ElementId>,
    diff: &mut ChainDiff,
) -> MutationResult<()> {
    let element = chain.get(id)?;
    let old_parent = element.parent;
    let old_lane = element.swimlane;

    ordering::remove_ordered_element(registry, chain, old_parent, id, diff)?;
    chain.set_parent(id, new_parent)?;

    let lane = match new_parent {
        Some(parent_id) => chain.get(parent_id)?.swimlane,
        None => {
            let reuse = swimlane::reuse_anchor(registry, chain, id)?.is_some();
            swimlane::root_swimlane_for(registry, chain, config, reuse, old_lane, diff)?
        }
    };
    swimlane::apply_to_subtree(chain, id, lane, diff)?;
    ordering::assign_priority(registry, chain, id, diff)?;

    for touched in [old_parent, new_parent, Some(id)].into_iter().flatten() {
        mark_updated(chain, diff, touched);
    }
    if old_parent.is_none() || new_parent.is_none() {
        for lane_id in [old_lane, lane].into_iter().flatten() {
            mark_updated(chain, diff, lane_id);
        }
    }
    trace!(element_id:% = id, parent:? = new_parent; "Relocated element");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_core::{ChainId, Value};
    use chain_registry::{Quantity, RegistryBuilder};

    fn registry() -> Registry {
        let mut builder = RegistryBuilder::with_builtin_types();
        builder.add_type("script").done().unwrap();
        builder.add_type("if").ordered("priority").done().unwrap();
        builder.add_type("else").deprecated().done().unwrap();
        builder
            .add_type("condition")
            .container()
            .allow_child("if", Quantity::OneOrMany)
            .allow_child("else", Quantity::One)
            .done()
            .unwrap();
        builder
            .add_type("split")
            .container()
            .allow_child("script", Quantity::TwoOrMany)
            .default_property("name", "Split")
            .done()
            .unwrap();
        builder.build().unwrap()
    }

    fn chain() -> Chain {
        Chain::new(ChainId::new(1), "c")
    }

    // ========== TEST: create_applies_defaults_and_mandatory_children ==========
    #[test]
    fn test_create_applies_defaults_and_mandatory_children() {
        // GIVEN split requiring two scripts
        let registry = registry();
        let mut chain = chain();
        let mut diff = ChainDiff::new();

        // WHEN create split
        let split = create(
            &registry,
            &mut chain,
            &EngineConfig::default(),
            "split",
            None,
            None,
            &mut diff,
        )
        .unwrap();

        // THEN two scripts are created under it with the default name
        let element = chain.get(split).unwrap();
        assert_eq!(element.children().len(), 2);
        assert_eq!(element.get_property("name"), Some(&Value::from("Split")));
        assert_eq!(diff.created_elements().count(), 3);
    }

    // ========== TEST: deprecated_mandatory_children_skipped ==========
    #[test]
    fn test_deprecated_mandatory_children_skipped() {
        let registry = registry();
        let mut chain = chain();
        let mut diff = ChainDiff::new();

        let condition = create(
            &registry,
            &mut chain,
            &EngineConfig::default(),
            "condition",
            None,
            None,
            &mut diff,
        )
        .unwrap();

        let children = chain.get(condition).unwrap().children().to_vec();
        assert_eq!(children.len(), 1);
        let branch = chain.get(children[0]).unwrap();
        assert_eq!(branch.type_name, "if");
        assert_eq!(branch.get_property("priority"), Some(&Value::Int(0)));
    }

    // ========== TEST: create_unknown_type ==========
    #[test]
    fn test_create_unknown_type() {
        let registry = registry();
        let mut chain = chain();
        let mut diff = ChainDiff::new();

        let err = create(
            &registry,
            &mut chain,
            &EngineConfig::default(),
            "mapper",
            None,
            None,
            &mut diff,
        )
        .unwrap_err();

        assert!(matches!(err, MutationError::UnknownType { .. }));
        assert!(diff.is_empty());
    }

    // ========== TEST: delete_floor_check ==========
    #[test]
    fn test_delete_floor_check() {
        // GIVEN split with its two mandatory scripts
        let registry = registry();
        let mut chain = chain();
        let mut diff = ChainDiff::new();
        let config = EngineConfig::default();
        let split = create(&registry, &mut chain, &config, "split", None, None, &mut diff).unwrap();
        let first = chain.get(split).unwrap().children()[0];

        // WHEN deleting one script
        let err = delete_by_id(&registry, &mut chain, first, &mut diff).unwrap_err();

        // THEN the floor protects it
        assert!(err.is_validation());

        // WHEN a third script is added, one may go
        let third =
            create(&registry, &mut chain, &config, "script", Some(split), None, &mut diff).unwrap();
        delete_by_id(&registry, &mut chain, third, &mut diff).unwrap();
        assert_eq!(chain.get(split).unwrap().children().len(), 2);
    }

    // ========== TEST: group_and_ungroup ==========
    #[test]
    fn test_group_and_ungroup() {
        // GIVEN two root scripts
        let registry = registry();
        let config = EngineConfig::default();
        let mut chain = chain();
        let mut diff = ChainDiff::new();
        let a = create(&registry, &mut chain, &config, "script", None, None, &mut diff).unwrap();
        let b = create(&registry, &mut chain, &config, "script", None, None, &mut diff).unwrap();

        // WHEN grouped
        let mut diff = ChainDiff::new();
        let group_id = group(&registry, &mut chain, &config, &[a, b, a], &mut diff).unwrap();

        // THEN both sit in the group once
        assert_eq!(chain.get(group_id).unwrap().children(), &[a, b]);
        assert!(diff.is_created(group_id));
        assert!(diff.is_updated(a) && diff.is_updated(b));

        // AND grouping a nested element is an illegal state
        let err = group(&registry, &mut chain, &config, &[a], &mut diff).unwrap_err();
        assert!(matches!(err, MutationError::IllegalState { .. }));

        // WHEN ungrouped
        let mut diff = ChainDiff::new();
        let released = ungroup(&registry, &mut chain, &config, group_id, &mut diff).unwrap();

        // THEN the children are back at the root
        assert_eq!(released, vec![a, b]);
        assert!(chain.get(a).unwrap().is_root());
        assert!(!chain.contains(group_id));
        assert!(diff.is_removed(group_id));
    }

    // ========== TEST: ungroup_rejects_non_group ==========
    #[test]
    fn test_ungroup_rejects_non_group() {
        let registry = registry();
        let config = EngineConfig::default();
        let mut chain = chain();
        let mut diff = ChainDiff::new();
        let split = create(&registry, &mut chain, &config, "split", None, None, &mut diff).unwrap();

        let err = ungroup(&registry, &mut chain, &config, split, &mut diff).unwrap_err();

        assert!(matches!(err, MutationError::IllegalState { .. }));
    }

    // ========== TEST: clone_into_own_subtree_terminates ==========
    #[test]
    fn test_clone_into_own_subtree_terminates() {
        // GIVEN a group holding a script
        let registry = registry();
        let config = EngineConfig::default();
        let mut chain = chain();
        let mut diff = ChainDiff::new();
        let script =
            create(&registry, &mut chain, &config, "script", None, None, &mut diff).unwrap();
        let group_id = group(&registry, &mut chain, &config, &[script], &mut diff).unwrap();

        // WHEN the group is cloned into itself
        let mut diff = ChainDiff::new();
        let copy = clone(&registry, &mut chain, &config, group_id, Some(group_id), &mut diff)
            .unwrap();

        // THEN exactly one copy of the original subtree is made
        assert_eq!(diff.created_elements().count(), 2);
        assert_eq!(chain.get(group_id).unwrap().children(), &[script, copy]);
        assert_eq!(chain.get(copy).unwrap().children().len(), 1);
    }

    // ========== TEST: change_parent_rejects_cycles ==========
    #[test]
    fn test_change_parent_rejects_cycles() {
        let registry = registry();
        let config = EngineConfig::default();
        let mut chain = chain();
        let mut diff = ChainDiff::new();
        let script =
            create(&registry, &mut chain, &config, "script", None, None, &mut diff).unwrap();
        let outer = group(&registry, &mut chain, &config, &[script], &mut diff).unwrap();
        let other = create(&registry, &mut chain, &config, "script", None, None, &mut diff).unwrap();
        let inner = group(&registry, &mut chain, &config, &[other], &mut diff).unwrap();
        change_parent(&registry, &mut chain, &config, inner, Some(outer), &mut diff).unwrap();

        let err = change_parent(&registry, &mut chain, &config, outer, Some(inner), &mut diff)
            .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(chain.get(inner).unwrap().parent, Some(outer));
    }

    // ========== TEST: reference_cleanup ==========
    #[test]
    fn test_reference_cleanup() {
        // GIVEN a reuse fragment referenced by another element
        let mut builder = RegistryBuilder::with_builtin_types();
        builder
            .add_type("reuse")
            .container()
            .reuse()
            .referenced_by_another_element()
            .done()
            .unwrap();
        builder
            .add_type("reuse-reference")
            .reference_property("reuseElementId")
            .done()
            .unwrap();
        let registry = builder.build().unwrap();
        let config = EngineConfig::default();
        let mut chain = chain();
        let mut diff = ChainDiff::new();
        let reuse = create(&registry, &mut chain, &config, "reuse", None, None, &mut diff).unwrap();
        let reference =
            create(&registry, &mut chain, &config, "reuse-reference", None, None, &mut diff)
                .unwrap();
        chain
            .set_property(reference, "reuseElementId", Value::ElementRef(reuse))
            .unwrap();

        // WHEN the fragment is deleted
        let mut diff = ChainDiff::new();
        delete_by_id(&registry, &mut chain, reuse, &mut diff).unwrap();

        // THEN the reference property is gone
        assert!(chain
            .get(reference)
            .unwrap()
            .get_property("reuseElementId")
            .is_none());
        assert!(diff.is_updated(reference));
        assert!(diff.is_removed(reuse));
    }

    // ========== TEST: delete_prunes_reference_lists ==========
    #[test]
    fn test_delete_prunes_reference_lists() {
        // GIVEN a switch listing two scripts among its targets
        let mut builder = RegistryBuilder::with_builtin_types();
        builder.add_type("script").done().unwrap();
        builder
            .add_type("switch")
            .reference_property("targets")
            .done()
            .unwrap();
        let registry = builder.build().unwrap();
        let config = EngineConfig::default();
        let mut chain = chain();
        let mut diff = ChainDiff::new();
        let a = create(&registry, &mut chain, &config, "script", None, None, &mut diff).unwrap();
        let b = create(&registry, &mut chain, &config, "script", None, None, &mut diff).unwrap();
        let switch = create(&registry, &mut chain, &config, "switch", None, None, &mut diff).unwrap();
        chain
            .set_property(
                switch,
                "targets",
                Value::List(vec![Value::ElementRef(a), Value::ElementRef(b)]),
            )
            .unwrap();

        // WHEN one listed script is deleted
        let mut diff = ChainDiff::new();
        delete_by_id(&registry, &mut chain, a, &mut diff).unwrap();

        // THEN only its entry is dropped
        assert_eq!(
            chain.get(switch).unwrap().get_property("targets"),
            Some(&Value::List(vec![Value::ElementRef(b)]))
        );
        assert!(diff.is_updated(switch));

        // WHEN the last listed script is deleted
        delete_by_id(&registry, &mut chain, b, &mut diff).unwrap();

        // THEN the emptied property is removed
        assert!(chain.get(switch).unwrap().get_property("targets").is_none());
    }

    // ========== TEST: group_keeps_first_reuse_lane ==========
    #[test]
    fn test_group_keeps_first_reuse_lane() {
        // GIVEN a reuse element in the reuse lane and a script in the default lane
        let mut builder = RegistryBuilder::with_builtin_types();
        builder.add_type("script").done().unwrap();
        builder.add_type("reuse").container().reuse().done().unwrap();
        let registry = builder.build().unwrap();
        let config = EngineConfig::default();
        let mut chain = chain();
        let mut diff = ChainDiff::new();
        let default_lane =
            swimlane::create(&registry, &mut chain, &config, ChainId::new(1), &mut diff).unwrap();
        let reuse = create(&registry, &mut chain, &config, "reuse", None, None, &mut diff).unwrap();
        let script = create(&registry, &mut chain, &config, "script", None, None, &mut diff).unwrap();
        let reuse_lane = chain.reuse_swimlane().unwrap();
        assert_eq!(chain.get(script).unwrap().swimlane, Some(default_lane));

        // WHEN grouping with the reuse element first
        let group_id = group(&registry, &mut chain, &config, &[reuse, script], &mut diff).unwrap();

        // THEN the group and its children live in the reuse lane
        assert_eq!(chain.get(group_id).unwrap().swimlane, Some(reuse_lane));
        assert_eq!(chain.get(script).unwrap().swimlane, Some(reuse_lane));
        assert_eq!(chain.get(reuse_lane).unwrap().members(), &[group_id]);
        assert!(chain.get(default_lane).unwrap().members().is_empty());
    }

    #[test]
    fn test_swimlane_type_not_creatable_here() {
        let registry = registry();
        let mut chain = chain();
        let mut diff = ChainDiff::new();

        let err = create(
            &registry,
            &mut chain,
            &EngineConfig::default(),
            "swimlane",
            None,
            None,
            &mut diff,
        )
        .unwrap_err();

        assert!(err.is_validation());
    }
}
