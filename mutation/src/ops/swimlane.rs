//! Swimlane operations - lane creation, transfer and deletion.

use chain_core::{messages, ChainId, ElementId, ElementKind, Value};
use chain_graph::Chain;
use chain_registry::Registry;
use log::{debug, trace};

use super::mark_updated;
use crate::config::EngineConfig;
use crate::diff::ChainDiff;
use crate::error::{MutationError, MutationResult};

/// Create a swimlane in the chain.
///
/// The first call creates the default lane and migrates every lane-less
/// root-level element into it; reuse elements get the reuse lane instead,
/// which is created on the way. Later calls create plain lanes. Returns the
/// id of the default or plain lane created.
pub fn create(
    registry: &Registry,
    chain: &mut Chain,
    config: &EngineConfig,
    chain_id: ChainId,
    diff: &mut ChainDiff,
) -> MutationResult<ElementId> {
    if chain_id != chain.id() {
        return Err(MutationError::ChainNotFound(chain_id));
    }

    if chain.default_swimlane().is_some() {
        let lane = insert_lane(registry, chain, config, false, false, diff)?;
        debug!(swimlane_id:% = lane; "Created swimlane");
        return Ok(lane);
    }

    let default_lane = insert_lane(registry, chain, config, true, false, diff)?;
    debug!(swimlane_id:% = default_lane; "Created default swimlane");

    let (reuse, regular): (Vec<ElementId>, Vec<ElementId>) = chain
        .root_elements()
        .into_iter()
        .filter(|id| chain.find_by_id(*id).is_some_and(|e| e.swimlane.is_none()))
        .partition(|id| {
            chain
                .find_by_id(*id)
                .is_some_and(|e| registry.is_reuse(&e.type_name))
        });

    for id in regular {
        apply_to_subtree(chain, id, Some(default_lane), diff)?;
    }

    if !reuse.is_empty() {
        let reuse_lane = ensure_reuse_swimlane(registry, chain, config, diff)?;
        for id in reuse {
            apply_to_subtree(chain, id, Some(reuse_lane), diff)?;
        }
    }

    Ok(default_lane)
}

/// Move a root-level element and its subtree into another swimlane.
///
/// A subtree holding a reuse element outside a reuse-typed root may only move
/// into the reuse lane. `None` resolves to the reuse lane for such subtrees
/// and to the default lane otherwise.
pub fn transfer_element_to_swimlane(
    registry: &Registry,
    chain: &mut Chain,
    swimlane: Option<ElementId>,
    id: ElementId,
    diff: &mut ChainDiff,
) -> MutationResult<()> {
    let element = chain
        .find_by_id(id)
        .ok_or(MutationError::ElementNotFound(id))?;
    if element.is_swimlane() {
        return Err(MutationError::validation(messages::ERR_SWIMLANE_AS_ELEMENT));
    }
    if !element.is_root() {
        return Err(MutationError::element_transfer(messages::ERR_TRANSFER_NESTED));
    }

    let anchor = reuse_anchor(registry, chain, id)?;
    let target = match swimlane {
        Some(lane) => lane,
        None => {
            let fallback = if anchor.is_some() {
                chain.reuse_swimlane()
            } else {
                chain.default_swimlane()
            };
            fallback.ok_or_else(|| {
                MutationError::element_transfer(format!(
                    "Chain {} has no swimlane to receive element {}",
                    chain.id(),
                    id
                ))
            })?
        }
    };

    let lane = chain
        .find_by_id(target)
        .ok_or(MutationError::ElementNotFound(target))?;
    if !lane.is_swimlane() {
        return Err(MutationError::element_transfer(format!(
            "Element {} is not a swimlane",
            target
        )));
    }
    if let Some(reuse_element) = anchor.filter(|_| !lane.is_reuse_swimlane()) {
        return Err(MutationError::element_transfer(format!(
            "{}: element {} cannot move into swimlane {}",
            messages::ERR_REUSE_OUTSIDE_REUSE_LANE,
            reuse_element,
            target
        )));
    }

    debug!(element_id:% = id, swimlane_id:% = target; "Transferring element");
    apply_to_subtree(chain, id, Some(target), diff)
}

/// Delete a swimlane, re-homing its members.
///
/// Members fall back to the default lane when it survives and are detached
/// otherwise. Members bound to the reuse lane are always detached.
pub fn delete(
    registry: &Registry,
    chain: &mut Chain,
    swimlane_id: ElementId,
    diff: &mut ChainDiff,
) -> MutationResult<()> {
    let lane = chain
        .find_by_id(swimlane_id)
        .ok_or(MutationError::ElementNotFound(swimlane_id))?;
    if !lane.is_swimlane() {
        return Err(MutationError::validation(format!(
            "Element {} is not a swimlane",
            swimlane_id
        )));
    }

    let structural = lane.is_default_swimlane() || lane.is_reuse_swimlane();
    let plain_lanes_exist = chain.swimlanes().into_iter().any(|id| {
        chain
            .find_by_id(id)
            .is_some_and(|l| !l.is_default_swimlane() && !l.is_reuse_swimlane())
    });
    if structural && plain_lanes_exist {
        return Err(MutationError::element_deletion(
            messages::ERR_STRUCTURAL_SWIMLANE,
        ));
    }

    let fallback = chain.default_swimlane().filter(|d| *d != swimlane_id);
    let members = lane.members().to_vec();

    for member in members {
        let bound = reuse_anchor(registry, chain, member)?.is_some();
        let target = if bound { None } else { fallback };
        apply_to_subtree(chain, member, target, diff)?;
    }

    let (removed, _) = chain.remove_element(swimlane_id)?;
    diff.add_removed_element(removed);
    debug!(swimlane_id:% = swimlane_id; "Deleted swimlane");
    Ok(())
}

/// Swimlane a new root-level element lands in.
///
/// `reuse` tells whether the element is bound to the reuse lane.
pub(crate) fn resolve_root_swimlane(
    registry: &Registry,
    chain: &mut Chain,
    config: &EngineConfig,
    reuse: bool,
    requested: Option<ElementId>,
    diff: &mut ChainDiff,
) -> MutationResult<Option<ElementId>> {
    if let Some(lane_id) = requested {
        let lane = chain
            .find_by_id(lane_id)
            .ok_or(MutationError::ElementNotFound(lane_id))?;
        if !lane.is_swimlane() {
            return Err(MutationError::validation(format!(
                "Element {} is not a swimlane",
                lane_id
            )));
        }
        if reuse && !lane.is_reuse_swimlane() {
            return Err(MutationError::validation(
                messages::ERR_REUSE_OUTSIDE_REUSE_LANE,
            ));
        }
        return Ok(Some(lane_id));
    }

    if !chain.has_swimlanes() {
        return Ok(None);
    }
    if reuse {
        return ensure_reuse_swimlane(registry, chain, config, diff).map(Some);
    }
    Ok(chain.default_swimlane())
}

/// Swimlane an element keeps when it becomes root-level.
///
/// The current lane is kept unless `reuse` binds the element to the reuse
/// lane and the current lane is another one. Otherwise the lane is resolved
/// as for a new element.
pub(crate) fn root_swimlane_for(
    registry: &Registry,
    chain: &mut Chain,
    config: &EngineConfig,
    reuse: bool,
    current: Option<ElementId>,
    diff: &mut ChainDiff,
) -> MutationResult<Option<ElementId>> {
    let fits = current
        .and_then(|id| chain.find_by_id(id))
        .is_some_and(|lane| lane.is_swimlane() && (!reuse || lane.is_reuse_swimlane()));
    if fits {
        return Ok(current);
    }
    resolve_root_swimlane(registry, chain, config, reuse, None, diff)
}

/// Reuse element binding the subtree rooted at `id` to the reuse lane.
///
/// Reuse elements may only live in the reuse lane unless their top-level
/// ancestor is reuse-typed itself, in which case that ancestor is the anchor.
pub(crate) fn reuse_anchor(
    registry: &Registry,
    chain: &Chain,
    id: ElementId,
) -> MutationResult<Option<ElementId>> {
    if registry.is_reuse(&chain.get(id)?.type_name) {
        return Ok(Some(id));
    }
    Ok(chain.subtree(id)?.into_iter().find(|element_id| {
        chain
            .find_by_id(*element_id)
            .is_some_and(|e| registry.is_reuse(&e.type_name))
    }))
}

/// Return the reuse lane, creating it when missing.
pub(crate) fn ensure_reuse_swimlane(
    registry: &Registry,
    chain: &mut Chain,
    config: &EngineConfig,
    diff: &mut ChainDiff,
) -> MutationResult<ElementId> {
    if let Some(lane) = chain.reuse_swimlane() {
        return Ok(lane);
    }
    let lane = insert_lane(registry, chain, config, false, true, diff)?;
    debug!(swimlane_id:% = lane; "Created reuse swimlane");
    Ok(lane)
}

/// Assign `lane` to an element and all of its descendants.
pub(crate) fn apply_to_subtree(
    chain: &mut Chain,
    id: ElementId,
    lane: Option<ElementId>,
    diff: &mut ChainDiff,
) -> MutationResult<()> {
    let previous = chain.get(id)?.swimlane;

    for element_id in chain.subtree(id)? {
        if chain.get(element_id)?.swimlane != lane {
            trace!(element_id:% = element_id; "Updating swimlane");
            chain.set_swimlane(element_id, lane)?;
            mark_updated(chain, diff, element_id);
        }
    }

    if previous != lane {
        for lane_id in [previous, lane].into_iter().flatten() {
            mark_updated(chain, diff, lane_id);
        }
    }
    Ok(())
}

fn insert_lane(
    registry: &Registry,
    chain: &mut Chain,
    config: &EngineConfig,
    default: bool,
    reuse: bool,
    diff: &mut ChainDiff,
) -> MutationResult<ElementId> {
    let descriptor = registry
        .swimlane_descriptor()
        .ok_or_else(|| MutationError::illegal_state("No swimlane type is registered"))?;

    let name = match (default, reuse) {
        (true, _) => &config.default_swimlane_name,
        (_, true) => &config.reuse_swimlane_name,
        _ => &config.swimlane_name,
    };
    let mut properties = descriptor.default_properties.clone();
    properties.insert(config.name_property.clone(), Value::from(name.as_str()));

    let id = chain.insert_element(
        &descriptor.name,
        ElementKind::swimlane(default, reuse),
        properties,
    )?;
    if let Some(lane) = chain.find_by_id(id) {
        diff.add_created_element(lane.clone());
    }
    Ok(id)
}
