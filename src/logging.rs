//! Diagnostic logging setup.
//!
//! Service mode logs to stderr (which the host captures) unless
//! `WEBPROBE_LOG_FILE` names a file to append to; manual mode always logs
//! to stderr. The sink is chosen once at startup, never per call.

use std::env;
use std::fs::OpenOptions;
use std::io;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Environment variable naming an optional log file for service mode.
pub const LOG_FILE_ENV: &str = "WEBPROBE_LOG_FILE";

/// Initialize logging for service mode.
///
/// A file named by `WEBPROBE_LOG_FILE` that cannot be opened falls back to
/// stderr without aborting startup.
pub fn init() {
    let writer = match env::var(LOG_FILE_ENV) {
        Ok(path) if !path.is_empty() => {
            match OpenOptions::new().create(true).append(true).open(&path) {
                Ok(file) => BoxMakeWriter::new(Arc::new(file)),
                Err(err) => {
                    eprintln!("Failed to open log file {path}: {err}. Logging to stderr.");
                    BoxMakeWriter::new(io::stderr)
                }
            }
        }
        _ => BoxMakeWriter::new(io::stderr),
    };
    init_with_writer(writer);
}

/// Initialize logging for manual mode: always stderr.
pub fn init_stderr() {
    init_with_writer(BoxMakeWriter::new(io::stderr));
}

fn init_with_writer(writer: BoxMakeWriter) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_target(false)
        .init();
}
