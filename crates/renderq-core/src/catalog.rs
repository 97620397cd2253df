//! Catalog records: the raw products list the resolver is built from.
//!
//! One [`Product`] per entry of the service's `/products` response. The
//! `compatible_modules` strings are already in `type:version` form and are
//! taken verbatim as plugin identifiers.

use serde::{Deserialize, Serialize};

/// One product entry of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Application category, e.g. `"hou"`.
    pub app_type: String,
    /// Application version, e.g. `"17.5.229"`.
    pub version: String,
    /// Plugin identifiers this product version supports, each `type:version`.
    #[serde(default)]
    pub compatible_modules: Vec<String>,
}

impl Product {
    /// Convenience constructor, mainly for tests and fixtures.
    pub fn new<S, M, I>(app_type: S, version: S, compatible_modules: I) -> Self
    where
        S: Into<String>,
        M: Into<String>,
        I: IntoIterator<Item = M>,
    {
        Product {
            app_type: app_type.into(),
            version: version.into(),
            compatible_modules: compatible_modules.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_catalog_entry() {
        let json = r#"{
            "app_type": "hou",
            "version": "17.5.229",
            "compatible_modules": ["hou_redshift:2.6.37", "hou_arnold:3.0.1"]
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.app_type, "hou");
        assert_eq!(product.version, "17.5.229");
        assert_eq!(product.compatible_modules.len(), 2);
    }

    #[test]
    fn compatible_modules_default_to_empty() {
        let json = r#"{ "app_type": "maya", "version": "2019" }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert!(product.compatible_modules.is_empty());
    }
}
