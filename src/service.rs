//! Continuous-service adapter: the handler set the monitoring agent drives,
//! plus the thin line-delimited JSON transport it is served over.
//!
//! No business logic lives here. Every transport frame maps onto exactly one
//! call into the core: `check` onto [`Plugin::export`], `configure` onto
//! [`Plugin::configure`], `validate` onto [`Plugin::validate`]. One thread
//! per host connection, so concurrent checks run in parallel against the
//! shared plugin state.

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::Path;
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::{self, ConfigCandidate, ConfigStore, GlobalOptions};
use crate::error::ProbeError;
use crate::request::{self, RequestSpec};

/// The single check key this plugin serves.
pub const METRIC_KEY: &str = "webprobe.http";

/// Long-lived plugin state shared by all concurrent checks.
#[derive(Debug, Default)]
pub struct Plugin {
    store: ConfigStore,
}

impl Plugin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lifecycle hook: the host started the plugin.
    pub fn start(&self) {
        info!("webprobe plugin started");
    }

    /// Lifecycle hook: the host is about to stop the plugin.
    pub fn stop(&self) {
        info!("webprobe plugin stopped");
    }

    /// Serve one check. `params` is the ordered list
    /// `[url, auth_mode?, principal?, secret?]`; only the URL is mandatory.
    pub fn export(&self, key: &str, params: &[String]) -> Result<String, ProbeError> {
        if key != METRIC_KEY {
            return Err(ProbeError::UnsupportedKey(key.to_string()));
        }
        let spec = RequestSpec::from_params(params)?;
        // Credentials are deliberately left out of the log line.
        debug!(key, url = %spec.url, auth = %spec.auth_mode, "export");
        request::execute(&self.store, &spec)
    }

    /// Apply a new configuration: start from built-in defaults, overlay
    /// whatever decodes from the payload, fall back to the agent-wide
    /// timeout only when the local one resolved to 0, then commit (the
    /// store clamps). A payload that fails to decode keeps the defaults
    /// rather than aborting the reconfiguration.
    pub fn configure(&self, global: Option<&GlobalOptions>, options: Option<&serde_json::Value>) {
        let candidate = match options {
            Some(value) => match ConfigCandidate::from_value(value) {
                Ok(candidate) => candidate,
                Err(err) => {
                    error!("{err}; keeping defaults");
                    ConfigCandidate::default()
                }
            },
            None => ConfigCandidate::default(),
        };
        self.store.replace(candidate.resolve(global));
    }

    /// Pre-flight validation of a candidate payload. The active
    /// configuration is untouched either way.
    pub fn validate(&self, options: Option<&serde_json::Value>) -> Result<(), ProbeError> {
        let candidate = match options {
            Some(value) => ConfigCandidate::from_value(value)?,
            None => ConfigCandidate::default(),
        };
        config::validate(&candidate)
    }
}

/// One frame from the host: a single JSON object per line.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum HostRequest {
    Check {
        key: String,
        #[serde(default)]
        params: Vec<String>,
    },
    Configure {
        #[serde(default)]
        global: Option<GlobalOptions>,
        #[serde(default)]
        options: Option<serde_json::Value>,
    },
    Validate {
        #[serde(default)]
        options: Option<serde_json::Value>,
    },
    Stop,
}

/// Reply frame: either a value or an error message.
#[derive(Debug, Serialize)]
struct HostResponse {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl HostResponse {
    fn value(value: Option<String>) -> Self {
        Self {
            ok: true,
            value,
            error: None,
        }
    }

    fn error(message: String) -> Self {
        Self {
            ok: false,
            value: None,
            error: Some(message),
        }
    }
}

/// Remove a stale socket file left behind by a previous run, so binding
/// does not fail with "address already in use".
pub fn cleanup_socket(path: &Path) {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if !meta.is_dir() => {
            if let Err(err) = std::fs::remove_file(path) {
                warn!("failed to remove stale socket {}: {err}", path.display());
            }
        }
        Ok(_) => warn!(
            "socket path {} is a directory; leaving it alone",
            path.display()
        ),
        Err(err) if err.kind() != std::io::ErrorKind::NotFound => {
            warn!("failed to stat socket {}: {err}", path.display());
        }
        Err(_) => {}
    }
}

/// Bind the host transport and serve connections until the process is torn
/// down by the host.
pub fn serve(socket: &Path, plugin: Arc<Plugin>) -> Result<()> {
    cleanup_socket(socket);
    let listener = UnixListener::bind(socket)
        .with_context(|| format!("failed to bind host socket {}", socket.display()))?;
    plugin.start();
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let plugin = Arc::clone(&plugin);
                thread::spawn(move || {
                    if let Err(err) = handle_connection(stream, &plugin) {
                        debug!("host connection closed: {err:#}");
                    }
                });
            }
            Err(err) => warn!("failed to accept host connection: {err}"),
        }
    }
    Ok(())
}

fn handle_connection(stream: UnixStream, plugin: &Plugin) -> Result<()> {
    let mut writer = stream.try_clone().context("failed to clone host stream")?;
    let reader = BufReader::new(stream);
    for line in reader.lines() {
        let line = line.context("failed to read host frame")?;
        if line.trim().is_empty() {
            continue;
        }
        let (response, keep_going) = match serde_json::from_str::<HostRequest>(&line) {
            Ok(request) => dispatch_frame(plugin, request),
            Err(err) => (
                HostResponse::error(format!("malformed host frame: {err}")),
                true,
            ),
        };
        serde_json::to_writer(&mut writer, &response).context("failed to encode host reply")?;
        writer
            .write_all(b"\n")
            .context("failed to write host reply")?;
        if !keep_going {
            break;
        }
    }
    Ok(())
}

fn dispatch_frame(plugin: &Plugin, request: HostRequest) -> (HostResponse, bool) {
    match request {
        HostRequest::Check { key, params } => {
            let response = match plugin.export(&key, &params) {
                Ok(body) => HostResponse::value(Some(body)),
                Err(err) => HostResponse::error(err.to_string()),
            };
            (response, true)
        }
        HostRequest::Configure { global, options } => {
            plugin.configure(global.as_ref(), options.as_ref());
            (HostResponse::value(None), true)
        }
        HostRequest::Validate { options } => {
            let response = match plugin.validate(options.as_ref()) {
                Ok(()) => HostResponse::value(None),
                Err(err) => HostResponse::error(err.to_string()),
            };
            (response, true)
        }
        HostRequest::Stop => {
            // The host closes the process after this; we only log and let
            // the connection wind down.
            plugin.stop();
            (HostResponse::value(None), false)
        }
    }
}
