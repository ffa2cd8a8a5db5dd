pub mod commands;
pub mod config;
pub mod contracts;
pub mod error;
mod ingest;
pub mod report;
pub mod routing;
pub mod state;

pub use contracts::envelope::{FailureEnvelope, SuccessEnvelope};
pub use error::{ClientError, ClientResult};

pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");
