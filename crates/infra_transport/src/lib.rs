//! Transport Adapters
//!
//! One sender per delivery channel:
//!
//! - [`soap::SoapSender`]: SOAP 1.1 webservice with the batch in a CDATA body
//! - [`rest::RestSender`]: plain `application/xml` POST
//! - [`sftp::SftpSender`]: `lote_{n}.xml` upload over SFTP
//! - [`sender::ManualSender`]: out-of-band handoff, always succeeds
//!
//! All senders are infallible at the type level: every attempt yields a
//! [`DeliveryOutcome`], and scheduling decisions live with the caller.

pub mod config;
pub mod rest;
pub mod sender;
pub mod sftp;
pub mod soap;

use std::sync::Arc;

pub use config::{AuthConfig, EndpointConfig, TransportMethod};
pub use rest::RestSender;
pub use sender::{BatchDispatch, DeliveryOutcome, ManualSender, TransportSender};
pub use sftp::SftpSender;
pub use soap::SoapSender;

/// Resolves the sender for a transport method
pub struct SenderFactory;

impl SenderFactory {
    pub fn sender(method: TransportMethod) -> Arc<dyn TransportSender> {
        match method {
            TransportMethod::Soap => Arc::new(SoapSender),
            TransportMethod::Rest => Arc::new(RestSender),
            TransportMethod::Sftp => Arc::new(SftpSender),
            TransportMethod::Manual => Arc::new(ManualSender),
        }
    }
}
