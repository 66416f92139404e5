use crate::services::{GatewayError, StoreError};

/// Failure surfaced by a flow controller
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FlowError {
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    /// Backend refused the request or could not be reached
    #[error("{0}")]
    Auth(String),

    #[error("No active session")]
    SessionMissing,

    #[error("{0}")]
    ResetTicketMissing(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Auth,
    SessionMissing,
    ResetTicketMissing,
    Storage,
}

impl FlowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FlowError::Validation { .. } => ErrorKind::Validation,
            FlowError::Auth(_) => ErrorKind::Auth,
            FlowError::SessionMissing => ErrorKind::SessionMissing,
            FlowError::ResetTicketMissing(_) => ErrorKind::ResetTicketMissing,
            FlowError::Storage(_) => ErrorKind::Storage,
        }
    }
}

impl From<GatewayError> for FlowError {
    fn from(error: GatewayError) -> Self {
        FlowError::Auth(error.to_string())
    }
}

impl From<StoreError> for FlowError {
    fn from(error: StoreError) -> Self {
        FlowError::Storage(error.to_string())
    }
}
