//! Request execution: one HTTP(S) GET per check, built from a configuration
//! snapshot, with the response body returned verbatim.
//!
//! The client is constructed fresh for every call from the store snapshot,
//! so a reconfiguration never leaks stale TLS or timeout settings into a
//! later request and no client state is shared between checks.

use std::time::Duration;

use tracing::debug;
use ureq::Agent;
use ureq::tls::TlsConfig;

use crate::auth::{self, AuthDecision};
use crate::config::{ConfigStore, DEFAULT_TIMEOUT_SECS};
use crate::error::ProbeError;

/// Identifying user agent sent with every request.
const USER_AGENT: &str = concat!("webprobe/", env!("CARGO_PKG_VERSION"));

/// Upper bound on a fully materialized response body (10 MiB).
const MAX_BODY_BYTES: u64 = 10 * 1024 * 1024;

/// How many redirect hops to follow before giving up.
const MAX_REDIRECTS: u32 = 10;

/// One check request, constructed fresh from caller-supplied parameters.
#[derive(Debug, Clone, Default)]
pub struct RequestSpec {
    /// Target URL; must be non-empty after trimming.
    pub url: String,
    /// Auth mode tag: none (default), basic or bearer.
    pub auth_mode: String,
    /// Username for basic, token for bearer.
    pub principal: String,
    /// Password for basic; ignored otherwise.
    pub secret: String,
}

impl RequestSpec {
    /// Build a spec from the host's ordered parameter list
    /// `[url, auth_mode?, principal?, secret?]`.
    pub fn from_params(params: &[String]) -> Result<Self, ProbeError> {
        let url = params.first().map(|p| p.trim()).unwrap_or_default();
        if url.is_empty() {
            return Err(ProbeError::EmptyUrl);
        }
        let auth_mode = params
            .get(1)
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .unwrap_or("none");
        Ok(Self {
            url: url.to_string(),
            auth_mode: auth_mode.to_string(),
            principal: params.get(2).cloned().unwrap_or_default(),
            secret: params.get(3).cloned().unwrap_or_default(),
        })
    }
}

/// Perform the GET described by `spec` using a snapshot of the store's
/// configuration and return the full response body.
///
/// Any HTTP status counts as a success; interpreting the status or the body
/// is the caller's concern. Redirects are followed transparently, bounded
/// at [`MAX_REDIRECTS`] hops. Nothing is retried.
pub fn execute(store: &ConfigStore, spec: &RequestSpec) -> Result<String, ProbeError> {
    let url = spec.url.trim();
    if url.is_empty() {
        return Err(ProbeError::EmptyUrl);
    }

    let snapshot = store.read();
    // Safety net for a store that was never configured.
    let timeout_secs = if snapshot.timeout_secs > 0 {
        snapshot.timeout_secs
    } else {
        DEFAULT_TIMEOUT_SECS
    };

    // Decide authentication before touching the network.
    let decision = auth::dispatch(&spec.auth_mode, &spec.principal, &spec.secret)?;

    debug!(
        url,
        timeout_secs,
        skip_verify = snapshot.skip_verify,
        "sending GET"
    );

    let agent: Agent = Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(timeout_secs as u64)))
        .http_status_as_error(false)
        .max_redirects(MAX_REDIRECTS)
        .tls_config(
            TlsConfig::builder()
                .disable_verification(snapshot.skip_verify)
                .build(),
        )
        .build()
        .new_agent();

    let mut request = agent
        .get(url)
        .header("User-Agent", USER_AGENT)
        .header("Accept", "*/*");
    if let AuthDecision::Authorization(value) = &decision {
        request = request.header("Authorization", value.as_str());
    }

    let mut response = request.call().map_err(|e| ProbeError::Network {
        url: url.to_string(),
        source: Box::new(e),
    })?;

    let status = response.status();
    let body = response
        .body_mut()
        .with_config()
        .limit(MAX_BODY_BYTES)
        .read_to_string()
        .map_err(|e| ProbeError::BodyRead {
            url: url.to_string(),
            source: Box::new(e),
        })?;

    debug!(status = status.as_u16(), bytes = body.len(), "response received");

    Ok(body)
}
