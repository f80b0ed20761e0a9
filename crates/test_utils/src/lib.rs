//! Test Utilities Crate
//!
//! Shared fixtures and builders for the submission test suite.
//!
//! # Modules
//!
//! - `fixtures`: identity blocks, inbound response documents, schema paths
//! - `builders`: builder patterns for guide payloads

pub mod builders;
pub mod fixtures;

pub use builders::*;
pub use fixtures::*;
