//! Error taxonomy for the probe.
//!
//! Input problems are detected before any network call. Network and body
//! failures wrap the underlying transport error together with the target
//! URL. No failure is ever retried automatically.

use thiserror::Error;

/// All failure classes a check can produce.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The host asked for a check key this plugin does not serve.
    #[error("unsupported key: {0:?}")]
    UnsupportedKey(String),

    /// The mandatory URL parameter is missing or blank.
    #[error("the first parameter (url) is required and cannot be empty")]
    EmptyUrl,

    /// The auth mode tag is not one of the recognized values.
    #[error("unsupported auth mode {0:?}; valid values are: none, basic, bearer")]
    UnsupportedAuth(String),

    /// Bearer mode was requested without a token.
    #[error("auth mode 'bearer' requires a non-empty token in the third parameter")]
    MissingToken,

    /// A candidate configuration failed pre-flight validation.
    #[error("invalid configuration: {0}")]
    ConfigRejected(String),

    /// DNS, connect, TLS handshake or timeout failure during the request.
    #[error("HTTP request to {url:?} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    /// Response headers arrived but the body could not be read in full.
    #[error("failed to read response body from {url:?}: {source}")]
    BodyRead {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },
}
