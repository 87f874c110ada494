//! Plugin configuration: the shared store, the candidate decoder and the
//! pre-flight validator.
//!
//! The host delivers configuration as a loose JSON object. `ConfigCandidate`
//! is the only place that shape is interpreted; everything past that boundary
//! works with the typed `ProbeConfig`.

use std::sync::RwLock;

use serde::Deserialize;
use tracing::info;

use crate::error::ProbeError;

/// Built-in default timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: i64 = 10;

/// Allowed timeout range in seconds, inclusive.
pub const TIMEOUT_RANGE: std::ops::RangeInclusive<i64> = 1..=30;

/// Active plugin configuration.
///
/// Replaced wholesale on reconfiguration, never mutated field by field.
/// A value held by the request executor is a snapshot: a concurrent
/// reconfiguration cannot change an in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Request deadline in seconds, clamped into [1, 30] when stored.
    pub timeout_secs: i64,
    /// Disable TLS certificate verification.
    pub skip_verify: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            skip_verify: false,
        }
    }
}

impl ProbeConfig {
    /// Clamp the timeout into the allowed range. Last line of defense before
    /// a value becomes active; the validator rejects out-of-range candidates
    /// earlier in the normal path.
    fn clamped(mut self) -> Self {
        self.timeout_secs = self
            .timeout_secs
            .clamp(*TIMEOUT_RANGE.start(), *TIMEOUT_RANGE.end());
        self
    }
}

/// Agent-wide settings the host may pass alongside the plugin options.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct GlobalOptions {
    /// Agent-wide timeout, used only when the plugin timeout resolves to 0.
    #[serde(rename = "Timeout", default)]
    pub timeout_secs: i64,
}

/// Candidate configuration as decoded from a host payload.
///
/// Absent fields fall back to built-in defaults at resolve time. Unknown
/// keys in the payload are ignored.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ConfigCandidate {
    #[serde(rename = "Timeout")]
    pub timeout_secs: Option<i64>,
    #[serde(rename = "SkipVerify")]
    pub skip_verify: Option<bool>,
}

impl ConfigCandidate {
    /// Decode a host-supplied payload. This is the only fallible conversion
    /// between the host's loose representation and the typed candidate.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, ProbeError> {
        serde_json::from_value(value.clone()).map_err(|e| {
            ProbeError::ConfigRejected(format!("failed to parse plugin configuration: {e}"))
        })
    }

    /// Resolve the candidate into a concrete configuration: built-in defaults
    /// for absent fields, then the agent-wide timeout as a fallback when the
    /// local timeout came out as 0.
    pub fn resolve(&self, global: Option<&GlobalOptions>) -> ProbeConfig {
        let mut cfg = ProbeConfig {
            timeout_secs: self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            skip_verify: self.skip_verify.unwrap_or(false),
        };
        if cfg.timeout_secs == 0 {
            cfg.timeout_secs = match global {
                Some(g) if g.timeout_secs > 0 => g.timeout_secs,
                _ => DEFAULT_TIMEOUT_SECS,
            };
        }
        cfg
    }
}

/// Pre-flight check the host runs before committing a new configuration.
///
/// Applies the same range rule the store later clamps to, but as a hard
/// rejection: on failure the previously active configuration stays in force.
/// Never mutates any state and is safe to call before any configuration
/// exists.
pub fn validate(candidate: &ConfigCandidate) -> Result<(), ProbeError> {
    let timeout = candidate.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
    if !TIMEOUT_RANGE.contains(&timeout) {
        return Err(ProbeError::ConfigRejected(format!(
            "Timeout: value {timeout} is out of the allowed range [1..30]"
        )));
    }
    Ok(())
}

/// Concurrency-safe holder of the active configuration.
///
/// Reads copy the value under a shared lock; `replace` swaps it wholesale
/// under an exclusive lock. No I/O happens under either lock, so readers
/// only ever contend for the duration of the swap itself.
#[derive(Debug, Default)]
pub struct ConfigStore {
    active: RwLock<ProbeConfig>,
}

impl ConfigStore {
    /// Create a store holding the built-in defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the active configuration.
    pub fn read(&self) -> ProbeConfig {
        *self.active.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Atomically replace the active configuration. The timeout is clamped
    /// into [1, 30] unconditionally before the swap.
    pub fn replace(&self, candidate: ProbeConfig) {
        let next = candidate.clamped();
        *self.active.write().unwrap_or_else(|e| e.into_inner()) = next;
        info!(
            timeout = next.timeout_secs,
            skip_verify = next.skip_verify,
            "configuration applied"
        );
    }
}
