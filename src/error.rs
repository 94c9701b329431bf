//! Error taxonomy for the index core.
//!
//! The index never panics for data-dependent reasons (spec.md §7): cyclic
//! aliases, missing namespaces, and enhancement failures all degrade to
//! "no result" rather than propagating as `Result::Err`. The two variants
//! below exist so the internal control flow can be named precisely; the
//! public resolution API (`Index::resolve_constant`, `resolve_method`,
//! `linearized_ancestors_of`, ...) always collapses them to `None` / `vec![]`.
//! Only configuration loading is allowed to fail outward.

use std::fmt;

/// Raised internally while chasing a constant alias whose ultimate target
/// does not exist. Callers treat this the same as "no match".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvableAlias {
    pub alias_name: String,
}

impl fmt::Display for UnresolvableAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unresolvable alias: {}", self.alias_name)
    }
}

impl std::error::Error for UnresolvableAlias {}

/// Raised internally during linearization when a name has no namespace
/// entries at all (as opposed to merely lacking mixins).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonExistingNamespace {
    pub name: String,
}

impl fmt::Display for NonExistingNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no such namespace: {}", self.name)
    }
}

impl std::error::Error for NonExistingNamespace {}

/// A per-file, per-enhancement failure recorded against the file being
/// indexed. Logged, never raised; accumulated in `Index::indexing_errors`.
#[derive(Debug, Clone)]
pub struct IndexingError {
    pub uri: String,
    pub message: String,
}

impl fmt::Display for IndexingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.uri, self.message)
    }
}

/// Surfaced at configuration load time; the only error kind that is fatal
/// (spec.md §7: "Only malformed configuration is fatal, and only at load
/// time").
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub message: String,
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid configuration: {}", self.message)
    }
}

impl std::error::Error for ConfigValidationError {}
