//! Error types for the rent-pricing client.
//!
//! # Design
//! Two families live here. `TypeConversionError` is local: it only surfaces
//! when a caller explicitly asks for a strict read of a record field. The
//! tolerant read path never produces it.
//!
//! `ServerError` is the only error raised toward callers of the operations
//! layer. Every variant keeps the service's message text and opaque code
//! verbatim so callers can match on the kind and still inspect the code.

use serde_json::Value;
use thiserror::Error;

use crate::coerce::FieldType;
use crate::fault::ErrorKind;

/// A raw value could not be converted to the declared field type.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot convert {value} to {target}")]
pub struct TypeConversionError {
    /// The type the field is declared with.
    pub target: FieldType,
    /// The raw value as it appeared in the response.
    pub value: Value,
}

impl TypeConversionError {
    pub fn new(target: FieldType, value: &Value) -> Self {
        Self {
            target,
            value: value.clone(),
        }
    }
}

/// Errors returned by `RentClient` parse methods.
///
/// Produced exclusively by the fault translator from a `ServiceFault`
/// reported by the RPC channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServerError {
    /// The service rejected the caller's credentials or client name.
    #[error("authentication failed: {message} (code {code})")]
    Authentication { message: String, code: String },

    /// The service hit an internal failure while handling the call.
    #[error("internal service error: {message} (code {code})")]
    Internal { message: String, code: String },

    /// The call was understood but could not be carried out, e.g. an unknown
    /// property or unit.
    #[error("operation failed: {message} (code {code})")]
    Operation { message: String, code: String },

    /// Any fault whose classification is not recognised.
    #[error("server error: {message} (code {code})")]
    Server { message: String, code: String },
}

impl ServerError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, code: impl Into<String>) -> Self {
        let (message, code) = (message.into(), code.into());
        match kind {
            ErrorKind::Authentication => ServerError::Authentication { message, code },
            ErrorKind::Internal => ServerError::Internal { message, code },
            ErrorKind::Operation => ServerError::Operation { message, code },
            ErrorKind::Server => ServerError::Server { message, code },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ServerError::Authentication { .. } => ErrorKind::Authentication,
            ServerError::Internal { .. } => ErrorKind::Internal,
            ServerError::Operation { .. } => ErrorKind::Operation,
            ServerError::Server { .. } => ErrorKind::Server,
        }
    }

    /// The fault message exactly as the service reported it.
    pub fn message(&self) -> &str {
        match self {
            ServerError::Authentication { message, .. }
            | ServerError::Internal { message, .. }
            | ServerError::Operation { message, .. }
            | ServerError::Server { message, .. } => message,
        }
    }

    /// The opaque fault code exactly as the service reported it.
    pub fn code(&self) -> &str {
        match self {
            ServerError::Authentication { code, .. }
            | ServerError::Internal { code, .. }
            | ServerError::Operation { code, .. }
            | ServerError::Server { code, .. } => code,
        }
    }
}
