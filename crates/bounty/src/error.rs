use std::fmt;

use foundation::ids::{LocationId, SessionId};
use scene::RegistryError;

/// Why an intent was refused.
///
/// Every refusal leaves application state exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejected {
    /// A bounty was submitted without an evidence image.
    MissingEvidence,
    /// A bounty was submitted with no location selected.
    NoSelection,
    UnknownLocation(LocationId),
    /// Bounties are only offered for stale locations.
    NotStale(LocationId),
    /// Another verification is still running.
    SessionInFlight(SessionId),
    /// A pick ray did not hit any beacon.
    NothingPicked,
    InvalidQuery(String),
}

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejected::MissingEvidence => write!(f, "rejected: missing evidence image"),
            Rejected::NoSelection => write!(f, "rejected: no location selected"),
            Rejected::UnknownLocation(id) => write!(f, "rejected: unknown location {id}"),
            Rejected::NotStale(id) => write!(f, "rejected: location {id} is already fresh"),
            Rejected::SessionInFlight(session) => {
                write!(f, "rejected: verification {session} still in progress")
            }
            Rejected::NothingPicked => write!(f, "rejected: no beacon under pointer"),
            Rejected::InvalidQuery(msg) => write!(f, "rejected: {msg}"),
        }
    }
}

impl std::error::Error for Rejected {}

impl From<RegistryError> for Rejected {
    fn from(value: RegistryError) -> Self {
        match value {
            RegistryError::UnknownLocation(id) => Rejected::UnknownLocation(id),
            other => Rejected::InvalidQuery(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Io { path: String, message: String },
    Parse(String),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, message } => write!(f, "cannot read config {path}: {message}"),
            ConfigError::Parse(msg) => write!(f, "config parse error: {msg}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        ConfigError::Parse(value.to_string())
    }
}

impl From<RegistryError> for ConfigError {
    fn from(value: RegistryError) -> Self {
        ConfigError::Invalid(value.to_string())
    }
}
