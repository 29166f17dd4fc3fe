//! Lavendeux Host
//!
//! Loads the demo extension and serves it over stdin/stdout, one JSON
//! request per line:
//! - `extension`: name, author, version and the binding tables
//! - `describe`: signature of every binding
//! - `call`: `{"name": registered_name, "args": [tagged values]}`
//! - `state`: the state mapping kept for the extension
//!
//! Logs go to stderr, filtered by `RUST_LOG` (default `info`).

mod host;

use host::{Host, HostConfig};
use std::io;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const HOST_VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    info!(version = HOST_VERSION, "Lavendeux host starting");
    let config = HostConfig::from_env();

    let registry = match lavendeux_demo::demo_extension() {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "failed to load extension");
            return ExitCode::FAILURE;
        }
    };
    let host = Host::new(registry, &config);

    let stdin = io::stdin();
    let stdout = io::stdout();
    match host.serve(stdin.lock(), stdout.lock()) {
        Ok(()) => {
            info!("host shutting down");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "i/o failure");
            ExitCode::FAILURE
        }
    }
}
