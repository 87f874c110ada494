pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod request;
pub mod service;

pub use auth::{AuthDecision, dispatch};
pub use cli::Cli;
pub use config::{ConfigCandidate, ConfigStore, GlobalOptions, ProbeConfig, validate};
pub use error::ProbeError;
pub use request::{RequestSpec, execute};
pub use service::{METRIC_KEY, Plugin};
