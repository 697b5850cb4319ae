//! Dependency operations - edge creation with adoption, and edge removal.
//!
//! Creating a dependency from an element nested in a (non-group) container
//! pulls everything reachable from the target into that container. All checks
//! run before the first mutation, so a rejected dependency leaves the chain
//! untouched.

use chain_core::{messages, DependencyId, ElementId};
use chain_graph::Chain;
use chain_registry::Registry;
use indexmap::IndexMap;
use log::{debug, trace};
use std::collections::{HashSet, VecDeque};

use super::{element, mark_updated, swimlane};
use crate::config::EngineConfig;
use crate::diff::ChainDiff;
use crate::error::{MutationError, MutationResult};
use crate::validation;

/// Create a dependency `from -> to`.
pub fn create(
    registry: &Registry,
    chain: &mut Chain,
    config: &EngineConfig,
    from: ElementId,
    to: ElementId,
    diff: &mut ChainDiff,
) -> MutationResult<DependencyId> {
    let source = chain
        .find_by_id(from)
        .ok_or(MutationError::ElementNotFound(from))?;
    let target = chain
        .find_by_id(to)
        .ok_or(MutationError::ElementNotFound(to))?;

    if !source.accepts_dependencies() || !target.accepts_dependencies() {
        return Err(MutationError::validation(
            messages::ERR_DEPENDENCY_ON_CONTAINER,
        ));
    }
    if from == to {
        return Err(MutationError::validation(messages::ERR_SELF_DEPENDENCY));
    }
    if chain.find_dependency_between(from, to).is_some() {
        return Err(MutationError::validation(messages::ERR_DEPENDENCY_EXISTS));
    }

    let target_descriptor = validation::descriptor(registry, &target.type_name)?;
    if !target_descriptor.input_enabled {
        return Err(MutationError::validation(messages::ERR_INPUT_DISABLED));
    }
    let quantity = target_descriptor.input_quantity;
    if quantity.exceeds_max(target.input_dependencies.len() + 1) {
        return Err(MutationError::validation(format!(
            "Element {} accepts {} input dependencies",
            to, quantity
        )));
    }
    if !validation::descriptor(registry, &source.type_name)?.output_enabled {
        return Err(MutationError::validation(messages::ERR_OUTPUT_DISABLED));
    }

    if let Some(container) = adopting_container(registry, chain, from)? {
        let adoptees = collect_adoptees(registry, chain, container, from, to)?;
        check_adoption(registry, chain, container, &adoptees)?;

        let lane = chain.get(from)?.swimlane;
        for adoptee in adoptees {
            trace!(element_id:% = adoptee, container_id:% = container; "Adopting element");
            element::relocate(registry, chain, config, adoptee, Some(container), diff)?;
            swimlane::apply_to_subtree(chain, adoptee, lane, diff)?;
        }
    }

    let id = chain.insert_dependency(from, to)?;
    if let Some(dependency) = chain.find_dependency(id) {
        diff.add_created_dependency(*dependency);
    }
    mark_updated(chain, diff, from);
    mark_updated(chain, diff, to);

    debug!(dependency_id:% = id, from:% = from, to:% = to; "Created dependency");
    Ok(id)
}

/// Nearest ancestor of `id` that is a container other than a group.
fn adopting_container(
    registry: &Registry,
    chain: &Chain,
    id: ElementId,
) -> MutationResult<Option<ElementId>> {
    for ancestor in chain.ancestors(id)? {
        let element = chain.get(ancestor)?;
        if element.is_container() && !registry.is_group(&element.type_name) {
            return Ok(Some(ancestor));
        }
    }
    Ok(None)
}

/// Walk forward from `to` and collect the elements that must move into
/// `container`.
///
/// Fails when the walk reaches `from` or one of its ancestors, or an element
/// owned by a different non-group container.
fn collect_adoptees(
    registry: &Registry,
    chain: &Chain,
    container: ElementId,
    from: ElementId,
    to: ElementId,
) -> MutationResult<Vec<ElementId>> {
    let mut forbidden: HashSet<ElementId> = chain.ancestors(from)?.into_iter().collect();
    forbidden.insert(from);

    let mut visited = HashSet::from([to]);
    let mut queue = VecDeque::from([to]);
    let mut adoptees = Vec::new();

    while let Some(current) = queue.pop_front() {
        if forbidden.contains(&current) {
            return Err(MutationError::validation(messages::ERR_DEPENDENCY_CYCLE));
        }

        match adopting_container(registry, chain, current)? {
            Some(owner) if owner == container => {}
            Some(owner) => {
                return Err(MutationError::validation(format!(
                    "Element {} belongs to container {} and cannot be moved into {}",
                    current, owner, container
                )));
            }
            None => adoptees.push(current),
        }
        trace!(element_id:% = current; "Visited during adoption walk");

        for next in chain.successors(current) {
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }

    Ok(adoptees)
}

/// Check that every adoptee may live in `container`, in aggregate.
fn check_adoption(
    registry: &Registry,
    chain: &Chain,
    container: ElementId,
    adoptees: &[ElementId],
) -> MutationResult<()> {
    let parent = chain.get(container)?;
    let mut per_type: IndexMap<&str, usize> = IndexMap::new();

    for adoptee in adoptees {
        let element = chain.get(*adoptee)?;
        let descriptor = validation::descriptor(registry, &element.type_name)?;
        validation::check_parent_restriction(descriptor, Some(parent))?;
        *per_type.entry(element.type_name.as_str()).or_default() += 1;
    }
    for (type_name, added) in per_type {
        validation::check_child_cap(registry, chain, parent, type_name, added)?;
    }
    Ok(())
}

/// Delete a dependency.
pub fn delete_by_id(
    chain: &mut Chain,
    id: DependencyId,
    diff: &mut ChainDiff,
) -> MutationResult<()> {
    let dependency = chain.remove_dependency(id)?;
    mark_updated(chain, diff, dependency.from);
    mark_updated(chain, diff, dependency.to);
    diff.add_removed_dependency(dependency);
    debug!(dependency_id:% = id; "Deleted dependency");
    Ok(())
}

/// Delete several dependencies; nothing is removed unless all exist.
pub fn delete_all_by_ids(
    chain: &mut Chain,
    ids: &[DependencyId],
    diff: &mut ChainDiff,
) -> MutationResult<()> {
    if let Some(missing) = ids.iter().find(|id| chain.find_dependency(**id).is_none()) {
        return Err(MutationError::DependencyNotFound(*missing));
    }

    let mut seen = HashSet::new();
    for id in ids.iter().filter(|id| seen.insert(**id)) {
        delete_by_id(chain, *id, diff)?;
    }
    Ok(())
}
