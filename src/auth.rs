//! Authentication dispatch: decides what, if anything, to attach to the
//! outgoing request for a given auth mode.

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::error::ProbeError;

/// The credential attachment chosen for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    /// No credential attached.
    Anonymous,
    /// Value for the `Authorization` header.
    Authorization(String),
}

/// Pick the credential attachment for `mode`.
///
/// Matching is case-insensitive on the trimmed mode string; an empty mode
/// means `none`. For `basic` the principal is the username and the secret
/// the password (the secret may be empty). For `bearer` the principal is
/// the token and must be non-empty; the secret is ignored.
pub fn dispatch(mode: &str, principal: &str, secret: &str) -> Result<AuthDecision, ProbeError> {
    match mode.trim().to_ascii_lowercase().as_str() {
        "" | "none" => Ok(AuthDecision::Anonymous),
        "basic" => {
            let credentials = STANDARD.encode(format!("{principal}:{secret}"));
            Ok(AuthDecision::Authorization(format!("Basic {credentials}")))
        }
        "bearer" => {
            if principal.is_empty() {
                return Err(ProbeError::MissingToken);
            }
            Ok(AuthDecision::Authorization(format!("Bearer {principal}")))
        }
        other => Err(ProbeError::UnsupportedAuth(other.to_string())),
    }
}
