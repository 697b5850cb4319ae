//! Sibling ordering - keeps priorities of ordered siblings dense.

use chain_core::{messages, ChainElement, ElementId, Value};
use chain_graph::Chain;
use chain_registry::Registry;
use log::{debug, trace};

use super::mark_updated;
use crate::diff::ChainDiff;
use crate::error::{MutationError, MutationResult};

/// Check whether an element keeps a priority among its siblings.
pub fn is_ordered(registry: &Registry, element: &ChainElement) -> bool {
    registry.is_ordered(&element.type_name)
}

/// Ordered siblings of `element` under `parent`, the element included.
///
/// Siblings are the children of the same parent that share the element's type.
fn sibling_group(chain: &Chain, parent: Option<ElementId>, element: &ChainElement) -> Vec<ElementId> {
    chain
        .find_all_by_parent_id(parent)
        .into_iter()
        .filter(|id| {
            *id == element.id
                || chain
                    .find_by_id(*id)
                    .is_some_and(|s| s.type_name == element.type_name)
        })
        .collect()
}

fn priority_of(chain: &Chain, id: ElementId, property: &str) -> Option<i64> {
    chain
        .find_by_id(id)
        .and_then(|e| e.get_property(property))
        .and_then(Value::as_index)
}

fn in_range(priority: i64, size: usize) -> bool {
    priority >= 0 && (priority as usize) < size
}

fn checked_parent<'c>(
    chain: &'c Chain,
    parent: Option<ElementId>,
    id: ElementId,
) -> MutationResult<&'c ChainElement> {
    let element = chain
        .find_by_id(id)
        .ok_or(MutationError::ElementNotFound(id))?;
    if element.parent != parent {
        return Err(MutationError::validation(format!(
            "Element {} is not a direct child of {}",
            id,
            parent.map_or_else(|| "the chain root".to_string(), |p| p.to_string())
        )));
    }
    Ok(element)
}

/// Priority a new ordered element takes under `parent`.
///
/// Returns `None` for elements that are not ordered. The priority equals the
/// number of other siblings already holding a valid index.
pub fn calculate_priority(
    registry: &Registry,
    chain: &Chain,
    parent: Option<ElementId>,
    id: ElementId,
) -> MutationResult<Option<i64>> {
    let element = checked_parent(chain, parent, id)?;
    let Some(property) = registry.priority_property(&element.type_name) else {
        return Ok(None);
    };

    let others: Vec<ElementId> = sibling_group(chain, parent, element)
        .into_iter()
        .filter(|s| *s != id)
        .collect();
    let valid = others
        .iter()
        .filter_map(|s| priority_of(chain, *s, property))
        .filter(|p| in_range(*p, others.len()))
        .count();

    Ok(Some(valid as i64))
}

/// Write the calculated priority onto an ordered element.
pub(crate) fn assign_priority(
    registry: &Registry,
    chain: &mut Chain,
    id: ElementId,
    diff: &mut ChainDiff,
) -> MutationResult<()> {
    let parent = chain.get(id)?.parent;
    if let Some(priority) = calculate_priority(registry, chain, parent, id)? {
        let element = chain.get(id)?;
        if let Some(property) = registry.priority_property(&element.type_name) {
            trace!(element_id:% = id, priority; "Assigning priority");
            chain.set_property(id, property, Value::Int(priority))?;
            mark_updated(chain, diff, id);
        }
    }
    Ok(())
}

/// Move an ordered element to `new_priority`, shifting the siblings in between.
///
/// Priorities past the end of the group and unchanged priorities leave the
/// chain untouched.
pub fn change_priority(
    registry: &Registry,
    chain: &mut Chain,
    parent: Option<ElementId>,
    id: ElementId,
    new_priority: i64,
    diff: &mut ChainDiff,
) -> MutationResult<()> {
    if new_priority < 0 {
        return Err(MutationError::validation(messages::ERR_NEGATIVE_PRIORITY));
    }

    let element = checked_parent(chain, parent, id)?;
    let Some(property) = registry.priority_property(&element.type_name) else {
        return Err(MutationError::validation(format!(
            "Elements of type {} have no priority",
            element.type_name
        )));
    };
    let property = property.to_string();

    let group = sibling_group(chain, parent, element);
    let size = group.len();
    if new_priority as usize >= size {
        return Ok(());
    }

    let current = priority_of(chain, id, &property);
    if current == Some(new_priority) {
        return Ok(());
    }
    let old_priority = current
        .filter(|p| in_range(*p, size))
        .unwrap_or(size as i64 - 1);

    debug!(element_id:% = id, old_priority, new_priority; "Changing priority");

    for sibling in group.into_iter().filter(|s| *s != id) {
        let Some(priority) = priority_of(chain, sibling, &property) else {
            continue;
        };
        if !in_range(priority, size) {
            continue;
        }
        let shifted = if new_priority < old_priority
            && (new_priority..old_priority).contains(&priority)
        {
            priority + 1
        } else if new_priority > old_priority
            && (old_priority + 1..=new_priority).contains(&priority)
        {
            priority - 1
        } else {
            continue;
        };
        chain.set_property(sibling, &property, Value::Int(shifted))?;
        mark_updated(chain, diff, sibling);
    }

    chain.set_property(id, &property, Value::Int(new_priority))?;
    mark_updated(chain, diff, id);
    Ok(())
}

/// Close the gap an ordered element leaves behind under `parent`.
///
/// The element itself is not modified.
pub fn remove_ordered_element(
    registry: &Registry,
    chain: &mut Chain,
    parent: Option<ElementId>,
    id: ElementId,
    diff: &mut ChainDiff,
) -> MutationResult<()> {
    let element = checked_parent(chain, parent, id)?;
    let Some(property) = registry.priority_property(&element.type_name) else {
        return Ok(());
    };
    let property = property.to_string();

    let group = sibling_group(chain, parent, element);
    let size = group.len();
    let Some(removed) = priority_of(chain, id, &property).filter(|p| in_range(*p, size)) else {
        return Ok(());
    };

    for sibling in group.into_iter().filter(|s| *s != id) {
        match priority_of(chain, sibling, &property) {
            Some(priority) if priority > removed && in_range(priority, size) => {
                chain.set_property(sibling, &property, Value::Int(priority - 1))?;
                mark_updated(chain, diff, sibling);
            }
            _ => {}
        }
    }
    Ok(())
}
