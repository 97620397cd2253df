//! Resolver: compatible-combination queries over the products catalog.
//!
//! Built once from the catalog, the resolver populates a
//! [`CompatibilityGraph`] and answers three kinds of query:
//!
//! - [`Resolver::get_compatible_combinations`]: bidirectional edge search
//!   with partial-version matching (the interesting one),
//! - [`Resolver::get_versions_by_type`]: version listing for one type,
//! - [`Resolver::get_all_types`]: full catalog dump grouped by type.
//!
//! All queries are pure reads over the immutable graph; repeated calls with
//! the same arguments return identical results. The fuzzy match runs as
//! three explicit passes (raw match, prune, re-admit) over snapshot sets
//! rather than one mutating loop, so each phase is testable on its own.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::error::ResolverError;
use crate::graph::CompatibilityGraph;
use crate::id::ItemId;
use crate::matcher::VersionMatcher;
use crate::version::sort_versions;

/// Versions of one item type, as returned by resolver queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeVersions {
    /// Whether the type is a plugin category or a product.
    pub is_plugin: bool,
    /// Version strings, sorted ascending by numeric-aware comparison.
    pub versions: Vec<String>,
}

/// Query result: item type -> its matched versions. `BTreeMap` keeps the
/// output order deterministic.
pub type QueryResult = BTreeMap<String, TypeVersions>;

/// Computes compatible combinations of products and plugins.
#[derive(Debug, Clone)]
pub struct Resolver {
    graph: CompatibilityGraph,
}

impl Resolver {
    /// Builds the resolver from the products catalog in a single pass: one
    /// product node per record, one plugin node and one product->plugin edge
    /// per compatible module. Fails if a compatible-module identifier is not
    /// in `type:version` form.
    pub fn new(products: &[Product]) -> Result<Self, ResolverError> {
        let mut graph = CompatibilityGraph::new();

        for product in products {
            let product_id = ItemId::new(&product.app_type, &product.version);
            graph.add_node(product_id.clone(), false);

            for module in &product.compatible_modules {
                let plugin_id = ItemId::parse(module)?;
                graph.add_node(plugin_id.clone(), true);
                graph.add_edge(&product_id, &plugin_id);
            }
        }

        Ok(Resolver { graph })
    }

    /// Read-only access to the underlying graph.
    pub fn graph(&self) -> &CompatibilityGraph {
        &self.graph
    }

    /// Finds everything one compatibility hop away from the query items,
    /// grouped by type and version-sorted.
    ///
    /// Each query element is either `"type:version"` (full or partial
    /// version) or a bare `"type"` meaning any numeric version of that type.
    /// With `strict_version_matches` the elements are compared to edge
    /// endpoints by exact string equality instead of partial matching. Types
    /// named in the query are excluded from the result unless
    /// `include_query_types` is set.
    pub fn get_compatible_combinations<S: AsRef<str>>(
        &self,
        query: &[S],
        strict_version_matches: bool,
        include_query_types: bool,
    ) -> Result<QueryResult, ResolverError> {
        if query.is_empty() {
            return Err(ResolverError::EmptyQuery);
        }

        let query_types: HashSet<&str> =
            query.iter().map(|q| query_type(q.as_ref())).collect();

        let matches = if strict_version_matches {
            self.strict_matches(query)
        } else {
            let matchers: Vec<VersionMatcher> = query
                .iter()
                .map(|q| VersionMatcher::parse(q.as_ref()))
                .collect();
            self.fuzzy_matches(&matchers)
        };

        let skip_types = if include_query_types {
            HashSet::new()
        } else {
            query_types
        };
        Ok(self.aggregate(matches, &skip_types))
    }

    /// Versions of every node whose type equals `query`, sorted ascending.
    ///
    /// Linear scan over all nodes. Catalogs are small; revisit with a
    /// per-type index if that ever stops being true.
    pub fn get_versions_by_type(&self, query: &str) -> Vec<String> {
        let mut versions: Vec<String> = self
            .graph
            .nodes()
            .filter(|node| node.id.item_type() == query)
            .map(|node| node.id.version().to_string())
            .collect();
        sort_versions(&mut versions);
        versions
    }

    /// Full catalog dump: every type with all its versions, version-sorted.
    pub fn get_all_types(&self) -> QueryResult {
        let ids: Vec<&ItemId> = self.graph.nodes().map(|node| &node.id).collect();
        self.aggregate(ids.into_iter().collect(), &HashSet::new())
    }

    /// Strict mode: an edge contributes its other endpoint when one endpoint
    /// equals a query element exactly.
    fn strict_matches<S: AsRef<str>>(&self, query: &[S]) -> HashSet<&ItemId> {
        let wanted: HashSet<&str> = query.iter().map(AsRef::as_ref).collect();

        let mut matches = HashSet::new();
        for (from, to) in self.graph.edges() {
            if wanted.contains(from.as_str()) {
                matches.insert(to);
            }
            if wanted.contains(to.as_str()) {
                matches.insert(from);
            }
        }
        matches
    }

    /// Fuzzy mode: raw match, prune, re-admit.
    fn fuzzy_matches(&self, matchers: &[VersionMatcher]) -> HashSet<&ItemId> {
        // Pass 1: a matcher hit on either endpoint of an edge pulls BOTH
        // endpoints into the raw set. This is what makes the search return
        // combinations rather than exact hits.
        let mut raw: HashSet<&ItemId> = HashSet::new();
        for (from, to) in self.graph.edges() {
            if matchers.iter().any(|m| m.matches(from) || m.matches(to)) {
                raw.insert(from);
                raw.insert(to);
            }
        }

        // Pass 2: keep raw elements the matchers themselves accept; set
        // aside elements of types the query never mentioned; drop same-type
        // noise (queried type, but no matcher accepts it).
        let query_types: HashSet<&str> = matchers.iter().map(VersionMatcher::item_type).collect();
        let mut pruned: HashSet<&ItemId> = HashSet::new();
        let mut non_queried: HashSet<&ItemId> = HashSet::new();
        for &item in &raw {
            if matchers.iter().any(|m| m.matches(item)) {
                pruned.insert(item);
            } else if !query_types.contains(item.item_type()) {
                non_queried.insert(item);
            }
        }

        // Pass 3: re-admit a non-queried element when it shares an edge with
        // something that survived pruning. This restores legitimate
        // cross-type matches the type pruning would otherwise discard.
        let mut matches = pruned.clone();
        for &item in &non_queried {
            let keeps_an_edge = self.graph.edges().any(|(from, to)| {
                (from == item && pruned.contains(to)) || (to == item && pruned.contains(from))
            });
            if keeps_an_edge {
                matches.insert(item);
            }
        }
        matches
    }

    /// Groups identifiers by type into `{is_plugin, versions}`, skipping the
    /// given types and version-sorting each group.
    fn aggregate(&self, items: HashSet<&ItemId>, skip_types: &HashSet<&str>) -> QueryResult {
        let mut result = QueryResult::new();

        for item in items {
            let item_type = item.item_type();
            if skip_types.contains(item_type) {
                continue;
            }

            // Items come from the graph itself, so the lookup cannot miss.
            let is_plugin = self.graph.node(item).map(|n| n.is_plugin).unwrap_or(false);

            result
                .entry(item_type.to_string())
                .or_insert_with(|| TypeVersions {
                    is_plugin,
                    versions: Vec::new(),
                })
                .versions
                .push(item.version().to_string());
        }

        for group in result.values_mut() {
            sort_versions(&mut group.versions);
        }
        result
    }
}

/// The type component of a query element (everything before the first `:`,
/// or the whole element for bare types).
fn query_type(element: &str) -> &str {
    element.split_once(':').map(|(t, _)| t).unwrap_or(element)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalog() -> Vec<Product> {
        vec![
            Product::new(
                "hou",
                "17.5.173",
                vec!["hou_redshift:2.6.11", "hou_arnold:3.0.1"],
            ),
            Product::new(
                "hou",
                "17.5.229",
                vec!["hou_redshift:2.6.37", "hou_arnold:3.0.1"],
            ),
            Product::new("hou", "18.0.348", vec!["hou_redshift:2.6.37"]),
            Product::new("nuke", "10.5v1", vec!["nuke_cara:2.1.0"]),
            Product::new("nuke", "10.55", vec!["nuke_cara:2.5.0"]),
            Product::new("maya", "2019", Vec::<String>::new()),
        ]
    }

    fn resolver() -> Resolver {
        Resolver::new(&sample_catalog()).unwrap()
    }

    #[test]
    fn construction_counts_nodes_and_edges() {
        let r = resolver();
        // 6 products + 5 distinct plugins; one edge per module reference.
        assert_eq!(r.graph().node_count(), 11);
        assert_eq!(r.graph().edge_count(), 7);
    }

    #[test]
    fn construction_rejects_malformed_module() {
        let products = vec![Product::new("hou", "17.5", vec!["not-an-item"])];
        let err = Resolver::new(&products).unwrap_err();
        assert!(matches!(err, ResolverError::MalformedItem { .. }));
    }

    #[test]
    fn empty_query_is_a_usage_error() {
        let r = resolver();
        let err = r
            .get_compatible_combinations::<&str>(&[], false, false)
            .unwrap_err();
        assert!(matches!(err, ResolverError::EmptyQuery));
    }

    #[test]
    fn strict_query_returns_exact_counterparts() {
        let products = vec![Product::new("hou", "17.5", vec!["hou_redshift:2.6.37"])];
        let r = Resolver::new(&products).unwrap();

        let result = r
            .get_compatible_combinations(&["hou:17.5"], true, false)
            .unwrap();

        assert_eq!(result.len(), 1);
        let redshift = &result["hou_redshift"];
        assert!(redshift.is_plugin);
        assert_eq!(redshift.versions, ["2.6.37"]);
    }

    #[test]
    fn strict_query_ignores_partial_versions() {
        let r = resolver();
        // "hou:17.5" is not a node identifier in the sample catalog.
        let result = r
            .get_compatible_combinations(&["hou:17.5"], true, false)
            .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn fuzzy_partial_version_pulls_in_counterparts() {
        let r = resolver();
        let result = r
            .get_compatible_combinations(&["hou:17.5"], false, false)
            .unwrap();

        assert_eq!(result["hou_redshift"].versions, ["2.6.11", "2.6.37"]);
        assert_eq!(result["hou_arnold"].versions, ["3.0.1"]);
        assert!(!result.contains_key("hou"));
    }

    #[test]
    fn fuzzy_bare_type_matches_all_versions() {
        let r = resolver();
        let result = r.get_compatible_combinations(&["hou"], false, false).unwrap();

        assert_eq!(result["hou_redshift"].versions, ["2.6.11", "2.6.37"]);
        assert_eq!(result["hou_arnold"].versions, ["3.0.1"]);
        assert!(!result.contains_key("nuke_cara"));
        assert!(!result.contains_key("hou"));
    }

    #[test]
    fn include_query_types_keeps_the_queried_side() {
        let r = resolver();
        let result = r.get_compatible_combinations(&["hou"], false, true).unwrap();

        assert_eq!(
            result["hou"].versions,
            ["17.5.173", "17.5.229", "18.0.348"]
        );
        assert!(!result["hou"].is_plugin);
    }

    #[test]
    fn queried_type_noise_is_dropped() {
        // hou:18.0.348 enters the raw set through its shared hou_redshift
        // plugin, but no matcher accepts it, so it must not survive even
        // when query types are included.
        let r = resolver();
        let result = r
            .get_compatible_combinations(&["hou:17.5", "hou_redshift"], false, true)
            .unwrap();

        assert_eq!(result["hou"].versions, ["17.5.173", "17.5.229"]);
        assert_eq!(result["hou_redshift"].versions, ["2.6.11", "2.6.37"]);
    }

    #[test]
    fn cross_type_matches_are_readmitted() {
        // hou_arnold is never queried; it survives only because it shares an
        // edge with a pruned hou version.
        let r = resolver();
        let result = r
            .get_compatible_combinations(&["hou:17.5.229"], false, false)
            .unwrap();

        assert_eq!(result["hou_arnold"].versions, ["3.0.1"]);
        assert_eq!(result["hou_redshift"].versions, ["2.6.37"]);
    }

    #[test]
    fn version_separator_distinguishes_v_suffix() {
        let r = resolver();
        let result = r
            .get_compatible_combinations(&["nuke:10.5"], false, false)
            .unwrap();

        // Matches nuke:10.5v1 but not nuke:10.55.
        assert_eq!(result["nuke_cara"].versions, ["2.1.0"]);
    }

    #[test]
    fn reverse_lookup_from_plugin_to_products() {
        let r = resolver();
        let result = r
            .get_compatible_combinations(&["hou_redshift:2.6.37"], false, false)
            .unwrap();

        assert_eq!(result["hou"].versions, ["17.5.229", "18.0.348"]);
        assert!(!result["hou"].is_plugin);
    }

    #[test]
    fn get_versions_by_type_sorts_numerically() {
        let products = vec![
            Product::new("hou", "17.5.229", vec!["hou_redshift:2.6.9"]),
            Product::new("hou", "17.5.173", vec!["hou_redshift:2.6.10"]),
        ];
        let r = Resolver::new(&products).unwrap();

        assert_eq!(r.get_versions_by_type("hou"), ["17.5.173", "17.5.229"]);
        assert_eq!(r.get_versions_by_type("hou_redshift"), ["2.6.9", "2.6.10"]);
        assert!(r.get_versions_by_type("missing").is_empty());
    }

    #[test]
    fn get_all_types_partitions_every_node_once() {
        let r = resolver();
        let all = r.get_all_types();

        let total: usize = all.values().map(|group| group.versions.len()).sum();
        assert_eq!(total, r.graph().node_count());

        assert_eq!(all["hou"].versions, ["17.5.173", "17.5.229", "18.0.348"]);
        assert_eq!(all["maya"].versions, ["2019"]);
        assert!(all["hou_redshift"].is_plugin);
        assert!(!all["nuke"].is_plugin);
    }

    #[test]
    fn results_are_idempotent_across_resolvers() {
        let a = resolver();
        let b = resolver();

        let query = ["hou", "nuke:10.5"];
        assert_eq!(
            a.get_compatible_combinations(&query, false, false).unwrap(),
            b.get_compatible_combinations(&query, false, false).unwrap()
        );
        assert_eq!(a.get_all_types(), b.get_all_types());
    }

    #[test]
    fn repeated_module_references_do_not_duplicate_versions() {
        // hou_arnold:3.0.1 is referenced by two products; the match set is
        // keyed by identifier, so its version appears once.
        let r = resolver();
        let result = r.get_compatible_combinations(&["hou"], false, false).unwrap();
        assert_eq!(result["hou_arnold"].versions, ["3.0.1"]);
    }
}
