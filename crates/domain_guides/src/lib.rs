//! Guide Domain
//!
//! A guide is a single billing claim document: consultation, SP/SADT,
//! hospitalization summary, individual fee, or pre-authorization request.
//! All five kinds share one tagged aggregate with kind-specific detail
//! variants rather than parallel duplicated types.
//!
//! # Guide lifecycle
//!
//! ```text
//! Draft -> Submitted -> Locked
//! ```
//!
//! `locked` is a one-way latch: once set, every write path rejects further
//! changes. Guides are never deleted, only locked.

pub mod guide;
pub mod payload;
pub mod builder;
pub mod render;
pub mod error;

pub use guide::{Guide, GuideKind, GuideStatus};
pub use payload::{
    BeneficiaryIdentification, ContractedParty, GuidePayload, KindDetail,
    OperatorIdentification, ProcedureLine, ProviderIdentification,
};
pub use builder::GuideBuilder;
pub use error::GuideError;
