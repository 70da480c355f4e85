//! Contract-level errors raised before a request leaves the client

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiContractError {
    #[error("invalid {kind} id: {value:?}")]
    InvalidId { kind: &'static str, value: String },

    #[error("workflow document is not a JSON object: {0}")]
    InvalidWorkflowJson(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("request validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

impl ApiContractError {
    pub fn invalid_id(kind: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidId {
            kind,
            value: value.into(),
        }
    }
}

pub type ApiContractResult<T> = Result<T, ApiContractError>;
