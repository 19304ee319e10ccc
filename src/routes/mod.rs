/// Router Module Index
///
/// Splits the routing table by what the handlers require of the caller. Neither module
/// installs an authentication layer: the pipelines resolve the principal themselves,
/// after the entity lookup, so the ordering of 404 and 401 stays under their control.

/// Read-only endpoints plus tag creation. No principal required.
pub mod public;

/// Mutating endpoints for owned entities. The principal is resolved by the `Auth` extractor
/// and checked inside the service pipeline.
pub mod authenticated;
