//! Catalog item identifiers.
//!
//! Every node in the compatibility graph is keyed by an [`ItemId`] of the
//! exact form `"<type>:<version>"`, e.g. `"hou:17.5.229"`. The type is an
//! opaque catalog category (an application name or a plugin category); the
//! version is an opaque version string and is not required to be numeric.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ResolverError;

/// A `"type:version"` identifier for a product or plugin node.
///
/// The split between type and version is at the first `:`. Identifiers are
/// the unique keys of the compatibility graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(String);

impl ItemId {
    /// Builds an identifier from separate type and version parts.
    pub fn new(item_type: &str, version: &str) -> Self {
        ItemId(format!("{}:{}", item_type, version))
    }

    /// Parses a raw catalog string, requiring the `type:version` form.
    pub fn parse(raw: &str) -> Result<Self, ResolverError> {
        if raw.contains(':') {
            Ok(ItemId(raw.to_string()))
        } else {
            Err(ResolverError::MalformedItem {
                id: raw.to_string(),
            })
        }
    }

    /// The full identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The type component (everything before the first `:`).
    pub fn item_type(&self) -> &str {
        self.0.split_once(':').map(|(t, _)| t).unwrap_or(&self.0)
    }

    /// The version component (everything after the first `:`).
    pub fn version(&self) -> &str {
        self.0.split_once(':').map(|(_, v)| v).unwrap_or("")
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
