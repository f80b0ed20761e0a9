//! Core Kernel - Foundational types and utilities for the TISS submission system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Strongly-typed identifiers for guides, batches, and audit entries
//! - Deterministic integrity hashing for tamper detection

pub mod money;
pub mod identifiers;
pub mod integrity;

pub use money::{Money, Currency, MoneyError};
pub use identifiers::{GuideId, BatchId, ClinicId, AuditEntryId};
pub use integrity::{Canonical, integrity_hash, verify_integrity};
