//! TISS Wire Format
//!
//! This crate owns everything about the versioned XML wire format:
//!
//! - [`version`]: the registry mapping a TISS version string (e.g. `"3.05.02"`)
//!   to its XSD schema artifact, with the list of supported versions and the
//!   current default
//! - [`render`]: the batch envelope (`ans:mensagemTISS`) renderer
//! - [`dom`]: a tolerant, position-tracking XML reader used by response parsers
//! - [`xsd`]: structural validation of rendered documents against the schema
//!   resolved for their declared version
//!
//! The full national schema is an opaque versioned artifact; this crate never
//! hardcodes its content, only resolves and applies it.

pub mod version;
pub mod render;
pub mod dom;
pub mod xsd;
pub mod error;

pub use version::{VersionRegistry, VersionInfo, CURRENT_TISS_VERSION, SUPPORTED_VERSIONS};
pub use render::{EnvelopeHeader, render_envelope};
pub use dom::Element;
pub use xsd::{XsdValidator, ValidationReport, Violation, ViolationKind};
pub use error::WireError;
