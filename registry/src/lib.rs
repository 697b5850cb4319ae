//! Chain Registry
//!
//! The element descriptor catalog. Single source of truth for per-type
//! containment rules, multiplicities, dependency enablement, ordering and
//! deprecation flags. The registry is immutable after construction via
//! RegistryBuilder.

mod builder;
mod registry;
mod types;

pub use builder::{DescriptorBuilder, RegistryBuilder, RegistryError, GROUP_TYPE, SWIMLANE_TYPE};
pub use registry::Registry;
pub use types::*;
