//! Core error types for renderq-core.
//!
//! Uses `thiserror` for structured, matchable error variants. Resolver
//! queries are pure in-memory computations, so every failure here is a usage
//! error surfaced synchronously; nothing is retried and no call corrupts
//! resolver state for subsequent calls.

use thiserror::Error;

/// Errors produced by the compatibility resolver.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// A query was passed with no elements in it.
    #[error("query must contain at least one item")]
    EmptyQuery,

    /// A catalog identifier was not in `type:version` form.
    #[error("malformed item identifier '{id}': expected 'type:version'")]
    MalformedItem { id: String },
}
