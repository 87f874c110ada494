//! webprobe entry point.
//!
//! A first argument that is not a flag is the host socket path and selects
//! service mode; anything else is parsed as the manual one-shot command
//! line. This file contains only dispatch glue — the check logic lives in
//! the library modules.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use webprobe::config::{ConfigStore, ProbeConfig};
use webprobe::request::{self, RequestSpec};
use webprobe::service::{self, Plugin};
use webprobe::{Cli, logging};

fn main() -> ExitCode {
    if let Some(first) = env::args().nth(1) {
        if !first.starts_with('-') {
            return run_service(PathBuf::from(first));
        }
    }
    run_manual()
}

/// Continuous-service mode: serve checks over the host socket until the
/// host tears the process down.
fn run_service(socket: PathBuf) -> ExitCode {
    logging::init();
    let plugin = Arc::new(Plugin::new());
    if let Err(err) = service::serve(&socket, plugin) {
        eprintln!("Error: {err:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// Manual mode: one request, body to stdout, failure to stderr.
fn run_manual() -> ExitCode {
    logging::init_stderr();
    let cli = Cli::parse();

    // Fixed testing configuration for one-shot runs.
    let store = ConfigStore::new();
    store.replace(ProbeConfig {
        timeout_secs: 10,
        skip_verify: true,
    });

    let spec = RequestSpec {
        url: cli.url,
        auth_mode: cli.auth,
        principal: cli.user.unwrap_or_default(),
        secret: cli.pass.unwrap_or_default(),
    };

    match request::execute(&store, &spec) {
        Ok(body) => {
            println!("{body}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
