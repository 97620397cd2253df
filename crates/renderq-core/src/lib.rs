pub mod catalog;
pub mod error;
pub mod graph;
pub mod matcher;
pub mod resolver;
pub mod version;

mod id;

// Re-export commonly used types
pub use catalog::Product;
pub use error::ResolverError;
pub use graph::{CompatibilityGraph, ItemNode};
pub use id::ItemId;
pub use matcher::VersionMatcher;
pub use resolver::{QueryResult, Resolver, TypeVersions};
pub use version::version_cmp;
