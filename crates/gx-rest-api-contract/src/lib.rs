//! Galaxy REST API contract types and validation
//!
//! This crate defines the request and response shapes exchanged with a Galaxy
//! server's workflow, history, history-contents and tool endpoints. These
//! types are shared between the mock client, the REST client and the
//! end-to-end test suite.

pub mod error;
pub mod types;
pub mod validation;

pub use error::*;
pub use types::*;
pub use validation::*;
