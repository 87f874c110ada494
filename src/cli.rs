//! Command-line surface for manual (one-shot) mode.

use clap::Parser;

/// Run a single HTTP(S) check and print the raw response body.
#[derive(Parser)]
#[command(name = "webprobe")]
#[command(about = "Perform one HTTP(S) GET check and print the raw response body")]
#[command(version)]
pub struct Cli {
    /// Target URL
    ///
    /// Passed as a flag so a bare first argument stays unambiguous: that is
    /// how the host hands over its socket path in service mode.
    #[arg(long)]
    pub url: String,

    /// Authentication mode (none, basic, bearer)
    #[arg(short, long, default_value = "none")]
    pub auth: String,

    /// Username (basic) or token (bearer)
    #[arg(short, long)]
    pub user: Option<String>,

    /// Password (basic only)
    #[arg(short, long)]
    pub pass: Option<String>,
}
