//! Mutation operation implementations.
//!
//! Each service (elements, dependencies, ordering, swimlanes) lives in its own
//! module. Operations take the registry and the chain explicitly and record
//! their effects in a caller-provided [`ChainDiff`].

pub mod dependency;
pub mod element;
pub mod ordering;
pub mod swimlane;

use chain_core::ElementId;
use chain_graph::Chain;

use crate::diff::ChainDiff;

/// Record the current state of an element as updated.
pub(crate) fn mark_updated(chain: &Chain, diff: &mut ChainDiff, id: ElementId) {
    if let Some(element) = chain.find_by_id(id) {
        diff.add_updated_element(element.clone());
    }
}
