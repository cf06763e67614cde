//! Translation of service faults into typed errors.
//!
//! # Design
//! The service spells one fault class several ways (`authentication`,
//! `AuthenticationFault`, `Authentication_Error`), so classifications are
//! compared after normalizing case, separators and a trailing `Fault` or
//! `Error`. The mapping is a static table; anything it does not name becomes
//! the generic `Server` kind.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ServerError;

/// A fault reported by the RPC channel instead of a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceFault {
    /// Fault classification, e.g. `authentication` or `AuthenticationFault`.
    pub classification: String,
    pub message: String,
    /// Opaque correlation code assigned by the service.
    pub code: String,
}

impl ServiceFault {
    pub fn new(
        classification: impl Into<String>,
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            classification: classification.into(),
            message: message.into(),
            code: code.into(),
        }
    }
}

/// The kind of `ServerError` a fault maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Authentication,
    Internal,
    Operation,
    Server,
}

/// Classification → error kind table.
#[derive(Debug, Clone, Copy)]
pub struct FaultMapping {
    entries: &'static [(&'static str, ErrorKind)],
}

/// The service's three documented fault classes.
pub static DEFAULT_FAULT_MAPPING: FaultMapping = FaultMapping::new(&[
    ("authentication", ErrorKind::Authentication),
    ("internal", ErrorKind::Internal),
    ("operation", ErrorKind::Operation),
]);

impl FaultMapping {
    pub const fn new(entries: &'static [(&'static str, ErrorKind)]) -> Self {
        Self { entries }
    }

    /// Classifications compare case-insensitively, ignoring `_`, whitespace,
    /// and a trailing `Fault` / `Error` (so `InternalErrorFault` is `internal`).
    pub fn classify(&self, classification: &str) -> ErrorKind {
        let normalized: String = classification
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        let stem = normalized
            .strip_suffix("fault")
            .unwrap_or(&normalized);
        let stem = stem.strip_suffix("error").unwrap_or(stem);
        self.entries
            .iter()
            .find(|(name, _)| *name == stem)
            .map(|(_, kind)| *kind)
            .unwrap_or(ErrorKind::Server)
    }

    pub fn translate(&self, fault: &ServiceFault) -> ServerError {
        let kind = self.classify(&fault.classification);
        warn!(
            classification = %fault.classification,
            code = %fault.code,
            ?kind,
            "service fault"
        );
        ServerError::new(kind, fault.message.clone(), fault.code.clone())
    }
}

/// Translate `fault` with the default mapping.
pub fn translate_fault(fault: &ServiceFault) -> ServerError {
    DEFAULT_FAULT_MAPPING.translate(fault)
}
