//! Client library for the render job-execution service.
//!
//! [`EnvoyClient`] talks to the locally running service agent: credential
//! validation, credit-balance checks, products catalog fetch, project file
//! upload, job-graph submission, and status polling. The products catalog
//! feeds [`renderq_core::Resolver`], which answers compatibility queries
//! offline.

pub mod client;
pub mod error;
pub mod job;
pub mod project;
pub mod watch;

pub use client::{EnvoyClient, SubmitOptions, DEFAULT_API_BASE};
pub use error::ClientError;
pub use job::Job;
pub use project::Project;
pub use watch::WatchFile;
