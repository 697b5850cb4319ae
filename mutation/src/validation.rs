//! Containment and multiplicity checks shared by the mutation operations.

use chain_core::{ChainElement, ElementId};
use chain_graph::Chain;
use chain_registry::{ElementDescriptor, Registry};

use crate::error::{MutationError, MutationResult};

/// Look up the descriptor of a type.
pub fn descriptor<'r>(registry: &'r Registry, type_name: &str) -> MutationResult<&'r ElementDescriptor> {
    registry
        .get_descriptor(type_name)
        .ok_or_else(|| MutationError::unknown_type(type_name))
}

/// Resolve an element that must be a container able to receive children.
pub fn container<'c>(chain: &'c Chain, id: ElementId) -> MutationResult<&'c ChainElement> {
    let element = chain
        .find_by_id(id)
        .ok_or(MutationError::ElementNotFound(id))?;
    if !element.is_container() {
        return Err(MutationError::validation(format!(
            "Element {} of type {} cannot contain children",
            id, element.type_name
        )));
    }
    Ok(element)
}

/// Check the allowed-parent set of `descriptor` against the actual parent.
pub fn check_parent_restriction(
    descriptor: &ElementDescriptor,
    parent: Option<&ChainElement>,
) -> MutationResult<()> {
    let parent_type = parent.map(|p| p.type_name.as_str());
    if descriptor.allows_parent(parent_type) {
        return Ok(());
    }
    Err(MutationError::validation(match parent_type {
        Some(parent_type) => format!(
            "Element of type {} cannot be placed inside {}",
            descriptor.name, parent_type
        ),
        None => format!(
            "Element of type {} must be placed inside one of: {}",
            descriptor.name,
            descriptor.parent_restriction.join(", ")
        ),
    }))
}

/// Count the children of `parent` that have the given type.
pub fn count_children_of_type(chain: &Chain, parent: &ChainElement, child_type: &str) -> usize {
    parent
        .children()
        .iter()
        .filter_map(|id| chain.find_by_id(*id))
        .filter(|child| child.type_name == child_type)
        .count()
}

/// Reject adding `added` children of `child_type` when that exceeds the cap.
///
/// Child types the parent does not declare are unconstrained here.
pub fn check_child_cap(
    registry: &Registry,
    chain: &Chain,
    parent: &ChainElement,
    child_type: &str,
    added: usize,
) -> MutationResult<()> {
    let Some(quantity) = descriptor(registry, &parent.type_name)?.child_quantity(child_type) else {
        return Ok(());
    };
    let count = count_children_of_type(chain, parent, child_type);
    if quantity.exceeds_max(count + added) {
        return Err(MutationError::validation(format!(
            "Element {} already holds the allowed number ({}) of {} children",
            parent.id, quantity, child_type
        )));
    }
    Ok(())
}

/// Reject removing one child of `child_type` when that drops below the floor.
pub fn check_child_floor(
    registry: &Registry,
    chain: &Chain,
    parent: &ChainElement,
    child_type: &str,
) -> MutationResult<()> {
    let Some(quantity) = descriptor(registry, &parent.type_name)?.child_quantity(child_type) else {
        return Ok(());
    };
    let count = count_children_of_type(chain, parent, child_type);
    if quantity.below_min(count.saturating_sub(1)) {
        return Err(MutationError::validation(format!(
            "Element {} requires {} {} children",
            parent.id, quantity, child_type
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_core::{props, ChainId, ElementKind};
    use chain_registry::{Quantity, RegistryBuilder};

    fn registry() -> Registry {
        let mut builder = RegistryBuilder::new();
        builder.add_type("try").parent("try-catch").done().unwrap();
        builder.add_type("catch").done().unwrap();
        builder
            .add_type("try-catch")
            .container()
            .allow_child("try", Quantity::One)
            .allow_child("catch", Quantity::OneOrMany)
            .done()
            .unwrap();
        builder.build().unwrap()
    }

    // ========== TEST: parent_restriction ==========
    #[test]
    fn test_parent_restriction() {
        // GIVEN try restricted to try-catch
        let registry = registry();
        let mut chain = Chain::new(ChainId::new(1), "c");
        let block = chain
            .insert_element("try-catch", ElementKind::container(), props!())
            .unwrap();
        let block = chain.get(block).unwrap();
        let try_descriptor = registry.get_descriptor("try").unwrap();

        // THEN try is accepted under try-catch only
        assert!(check_parent_restriction(try_descriptor, Some(block)).is_ok());
        let err = check_parent_restriction(try_descriptor, None).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("try-catch"));
    }

    // ========== TEST: cap_and_floor ==========
    #[test]
    fn test_cap_and_floor() {
        // GIVEN try-catch holding one try and one catch
        let registry = registry();
        let mut chain = Chain::new(ChainId::new(1), "c");
        let block = chain
            .insert_element("try-catch", ElementKind::container(), props!())
            .unwrap();
        for type_name in ["try", "catch"] {
            let child = chain
                .insert_element(type_name, ElementKind::Plain, props!())
                .unwrap();
            chain.set_parent(child, Some(block)).unwrap();
        }
        let parent = chain.get(block).unwrap();

        // THEN a second try exceeds the cap, a second catch does not
        assert!(check_child_cap(&registry, &chain, parent, "try", 1).is_err());
        assert!(check_child_cap(&registry, &chain, parent, "catch", 1).is_ok());
        assert!(check_child_cap(&registry, &chain, parent, "undeclared", 5).is_ok());

        // AND removing the only catch breaks the floor
        assert!(check_child_floor(&registry, &chain, parent, "catch").is_err());
        assert!(check_child_floor(&registry, &chain, parent, "undeclared").is_ok());
    }

    #[test]
    fn test_container_rejects_plain_element() {
        let mut chain = Chain::new(ChainId::new(1), "c");
        let plain = chain
            .insert_element("catch", ElementKind::Plain, props!())
            .unwrap();

        assert!(container(&chain, plain).unwrap_err().is_validation());
        assert!(container(&chain, ElementId::new(99)).unwrap_err().is_not_found());
    }
}
