use gx_client_api::ClientApiError;
use gx_rest_client::RestClientError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("client error: {0}")]
    Client(#[from] RestClientError),

    #[error("API error: {0}")]
    Api(#[from] ClientApiError),

    #[error("fixture error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invocation {invocation_id} still in progress after {attempts} polls")]
    Timeout { invocation_id: String, attempts: u32 },

    #[error("{0}")]
    Unexpected(String),
}

pub type HarnessResult<T> = Result<T, HarnessError>;
