// Entrypoint for the probe.
// - Keeps `main` small: resolve config, build the API client, hand both to
//   `probe::run`.
// - Setup problems propagate as `anyhow` errors; a failed stage has already
//   been printed by the probe and only turns into exit code 1.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tree_probe::{api::ApiClient, api::Species, config::ProbeConfig, probe, report::Reporter};

/// Log in, plant a test tree, list trees and show the frontend field mapping.
#[derive(Parser, Debug)]
#[command(name = "tree-probe")]
#[command(version, about)]
struct Args {
    /// API root (default: $TREE_PROBE_BASE_URL or http://localhost:8000/api).
    #[arg(long)]
    base_url: Option<String>,

    #[arg(long)]
    username: Option<String>,

    #[arg(long)]
    password: Option<String>,

    /// E-mail shown in the frontend session preview.
    #[arg(long)]
    email: Option<String>,

    /// Species of the planted test tree.
    #[arg(long)]
    species: Option<Species>,

    /// Frontend origin named in the browser checklist.
    #[arg(long)]
    frontend_url: Option<String>,

    /// Disable colored output.
    #[arg(long)]
    no_color: bool,

    /// Enable debug logging on stderr.
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply(self, mut config: ProbeConfig) -> Result<ProbeConfig, tree_probe::error::ProbeError> {
        if let Some(v) = self.base_url {
            config.base_url = v;
        }
        if let Some(v) = self.username {
            config.username = v;
        }
        if let Some(v) = self.password {
            config.password = v;
        }
        if let Some(v) = self.email {
            config.email = v;
        }
        if let Some(v) = self.species {
            config.tree.species = v;
        }
        if let Some(v) = self.frontend_url {
            config.frontend_url = v;
        }
        config.normalize()
    }
}

/// `RUST_LOG` wins when set; otherwise `-v` turns on debug output.
fn log_directive(verbose: bool, rust_log: Option<String>) -> String {
    match rust_log {
        Some(directive) if !directive.trim().is_empty() => directive,
        _ if verbose => "tree_probe=debug,info".into(),
        _ => "warn".into(),
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let directive = log_directive(args.verbose, std::env::var("RUST_LOG").ok());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let color = !args.no_color;
    let config = args.apply(ProbeConfig::from_env()?)?;
    let mut api = ApiClient::new(&config.base_url)?;
    let mut out = Reporter::stdout(color);

    match probe::run(&mut api, &config, &mut out) {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            tracing::debug!(error = %err, "probe halted");
            Ok(ExitCode::FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rust_log_overrides_verbose_flag() {
        assert_eq!(log_directive(true, Some("tree_probe=trace".into())), "tree_probe=trace");
        assert_eq!(log_directive(false, Some("error".into())), "error");
    }

    #[test]
    fn verbose_flag_applies_without_rust_log() {
        assert_eq!(log_directive(true, None), "tree_probe=debug,info");
        assert_eq!(log_directive(true, Some("  ".into())), "tree_probe=debug,info");
        assert_eq!(log_directive(false, None), "warn");
    }
}
