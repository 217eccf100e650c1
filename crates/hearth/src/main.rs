// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hearth - integration loader front end.
//!
//! Loads configuration, wires the built-in catalog and the optional custom
//! integrations directory into a [`Loader`], and runs one subcommand.

mod commands;
mod importer;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use hearth_config::model::HearthConfig;
use hearth_loader::{builtin_registry, DirectoryManifestSource, Loader, ManifestSource};

use crate::importer::DirectoryImporter;

/// Hearth - resolve, load and inspect integrations.
#[derive(Parser, Debug)]
#[command(name = "hearth", version, about, long_about = None)]
struct Cli {
    /// Configuration file to use instead of the standard lookup.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate dependency graphs (all known domains when none are given).
    Check {
        domains: Vec<String>,
    },
    /// Resolve a domain, import its component and the given platforms.
    Load {
        domain: String,
        #[arg(long = "platform", short)]
        platforms: Vec<String>,
    },
    /// Print the aggregated discovery indexes.
    Discovery {
        /// Emit JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },
    /// Show where to report a problem with an integration.
    ReportIssue {
        #[arg(long)]
        domain: Option<String>,
        #[arg(long)]
        module: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => hearth_config::load_and_validate_path(path),
        None => hearth_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            hearth_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level);
    let loader = build_loader(&config);

    let result = match cli.command {
        Some(Commands::Check { domains }) => commands::run_check(&loader, &domains).await,
        Some(Commands::Load { domain, platforms }) => {
            commands::run_load(&loader, &domain, &platforms).await
        }
        Some(Commands::Discovery { json }) => commands::run_discovery(&loader, json).await,
        Some(Commands::ReportIssue { domain, module }) => {
            commands::run_report_issue(
                &loader,
                &config.issues.tracker_url,
                domain.as_deref(),
                module.as_deref(),
            )
            .await
        }
        None => {
            println!("hearth: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn build_loader(config: &HearthConfig) -> Loader {
    let registry = Arc::new(builtin_registry());
    let dir = config.loader.custom_integrations_dir.clone();
    let source = dir
        .clone()
        .map(|d| Arc::new(DirectoryManifestSource::new(d)) as Arc<dyn ManifestSource>);
    let importer = Arc::new(DirectoryImporter::new(dir));
    Loader::new(&config.loader, registry, source, importer)
}

/// Initialize the tracing subscriber. `RUST_LOG` overrides the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hearth={log_level},hearth_loader={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
