//! Endpoint configuration
//!
//! One operator = one endpoint. The method selects the sender; the remaining
//! fields are interpreted by that sender only.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Delivery channel for a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMethod {
    Soap,
    Rest,
    Sftp,
    Manual,
}

impl TransportMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMethod::Soap => "soap",
            TransportMethod::Rest => "rest",
            TransportMethod::Sftp => "sftp",
            TransportMethod::Manual => "manual",
        }
    }
}

impl fmt::Display for TransportMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Authentication material for HTTP transports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum AuthConfig {
    None,
    Bearer { token: String },
    Basic { username: String, password: String },
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig::None
    }
}

/// Operator endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub method: TransportMethod,
    /// HTTP URL for SOAP/REST, host for SFTP
    #[serde(default)]
    pub url: String,
    /// SOAPAction header value
    #[serde(default)]
    pub soap_action: Option<String>,
    #[serde(default)]
    pub auth: AuthConfig,
    /// Extra per-operator parameters (headers, query string values)
    #[serde(default)]
    pub params: HashMap<String, String>,
    /// SFTP settings
    #[serde(default = "default_sftp_port")]
    pub sftp_port: u16,
    #[serde(default)]
    pub sftp_username: Option<String>,
    #[serde(default)]
    pub sftp_password: Option<String>,
    /// PEM-encoded private key, used instead of the password when present
    #[serde(default)]
    pub sftp_private_key: Option<String>,
    #[serde(default)]
    pub sftp_remote_dir: Option<String>,
    /// Per-attempt deadline
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_sftp_port() -> u16 {
    22
}

fn default_timeout_secs() -> u64 {
    30
}

impl EndpointConfig {
    /// Minimal configuration for a given method; callers fill in the rest
    pub fn for_method(method: TransportMethod) -> Self {
        Self {
            method,
            url: String::new(),
            soap_action: None,
            auth: AuthConfig::None,
            params: HashMap::new(),
            sftp_port: default_sftp_port(),
            sftp_username: None,
            sftp_password: None,
            sftp_private_key: None,
            sftp_remote_dir: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}
