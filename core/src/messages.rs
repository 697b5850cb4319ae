//! Common error messages used across chain engine components.
//!
//! These constants keep wording consistent between the services that raise
//! the same rule violation.

/// Error: dependency endpoints must differ.
pub const ERR_SELF_DEPENDENCY: &str = "Element cannot depend on itself";

/// Error: dependency between the same pair already exists.
pub const ERR_DEPENDENCY_EXISTS: &str = "Dependency already exists";

/// Error: containers and swimlanes cannot carry dependencies.
pub const ERR_DEPENDENCY_ON_CONTAINER: &str =
    "Dependencies cannot start or end at a container or swimlane";

/// Error: the target element does not accept input dependencies.
pub const ERR_INPUT_DISABLED: &str = "Element does not accept input dependencies";

/// Error: the source element does not produce output dependencies.
pub const ERR_OUTPUT_DISABLED: &str = "Element does not accept output dependencies";

/// Error: the dependency would close a loop.
pub const ERR_DEPENDENCY_CYCLE: &str = "Dependency would create a cycle";

/// Error: a swimlane was used where a regular element is expected.
pub const ERR_SWIMLANE_AS_ELEMENT: &str = "Swimlanes are managed by the swimlane service";

/// Error: priorities cannot be negative.
pub const ERR_NEGATIVE_PRIORITY: &str = "Priority cannot be negative";

/// Error: grouping requires at least one element.
pub const ERR_EMPTY_GROUP: &str = "At least one element is required to create a group";

/// Error: reuse elements live in the reuse swimlane only.
pub const ERR_REUSE_OUTSIDE_REUSE_LANE: &str =
    "Reuse elements can only be placed in the reuse swimlane";

/// Error: nested elements follow the swimlane of their container.
pub const ERR_TRANSFER_NESTED: &str = "Only root-level elements can be moved between swimlanes";

/// Error: structural swimlanes must be deleted last.
pub const ERR_STRUCTURAL_SWIMLANE: &str =
    "Default and reuse swimlanes cannot be deleted while other swimlanes exist";
