//! Shared fixtures for chain mutation integration tests.

#![allow(dead_code)]

use chain_core::{ChainId, ElementId};
use chain_graph::Chain;
use chain_registry::{Quantity, Registry, RegistryBuilder};

pub const CHAIN_ID: ChainId = ChainId::new(1);

/// Integration-flow catalog used across the integration tests.
pub fn flow_registry() -> Registry {
    let mut builder = RegistryBuilder::with_builtin_types();
    builder.add_type("script").done().unwrap();
    builder
        .add_type("http-trigger")
        .input_disabled()
        .done()
        .unwrap();
    builder
        .add_type("mapper")
        .input_quantity(Quantity::One)
        .done()
        .unwrap();
    builder
        .add_type("loop")
        .container()
        .default_property("name", "Loop")
        .done()
        .unwrap();
    builder
        .add_type("if")
        .parent("condition")
        .ordered("priority")
        .done()
        .unwrap();
    builder
        .add_type("condition")
        .container()
        .allow_child("if", Quantity::OneOrMany)
        .done()
        .unwrap();
    builder.add_type("try").parent("try-catch").done().unwrap();
    builder.add_type("catch").parent("try-catch").done().unwrap();
    builder
        .add_type("try-catch")
        .container()
        .allow_child("try", Quantity::One)
        .allow_child("catch", Quantity::OneOrMany)
        .done()
        .unwrap();
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
    builder.build().unwrap()
}

pub fn empty_chain() -> Chain {
    Chain::new(CHAIN_ID, "orders")
}

/// Children of `parent` having the given type.
pub fn children_of_type(chain: &Chain, parent: ElementId, type_name: &str) -> Vec<ElementId> {
    chain
        .find_all_by_parent_id(Some(parent))
        .into_iter()
        .filter(|id| chain.get(*id).is_ok_and(|e| e.type_name == type_name))
        .collect()
}

/// Priority property of an element as an integer.
pub fn priority(chain: &Chain, id: ElementId) -> Option<i64> {
    chain
        .get(id)
        .ok()
        .and_then(|e| e.get_property("priority"))
        .and_then(|v| v.as_index())
}
