//! Workload sizer CLI
//!
//! Sizes a workload locally with the built-in engine, or against a running
//! sizer service, and lists the instance catalog and nature presets.

mod client;
mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use commands::estimate::RequestSource;
use commands::{catalog, estimate};
use sizer_lib::{ModelVersion, NoopObserver, SizingEngine, TracingObserver, WorkloadNature};
use std::path::PathBuf;
use std::sync::Arc;

/// Workload hardware sizing
#[derive(Parser)]
#[command(name = "wsz")]
#[command(author, version, about = "Estimate cluster hardware for a workload", long_about = None)]
pub struct Cli {
    /// Sizer service URL used with --remote (or WSZ_API_URL)
    #[arg(long, env = "WSZ_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format (defaults to the config file, then table)
    #[arg(long, short, global = true)]
    pub format: Option<output::OutputFormat>,

    /// Estimator generation for local runs: analytic or linear
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Log every estimation step to stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Estimate hardware for a workload
    Estimate(EstimateArgs),

    /// List the instance catalog
    Catalog {
        /// Read the catalog from the service
        #[arg(long)]
        remote: bool,
    },

    /// List the workload nature presets
    Presets {
        /// Read the presets from the service
        #[arg(long)]
        remote: bool,
    },
}

#[derive(Args)]
pub struct EstimateArgs {
    /// JSON request file
    #[arg(long, conflicts_with_all = ["documents", "doc_size"])]
    pub file: Option<PathBuf>,

    /// Number of documents
    #[arg(long, required_unless_present = "file")]
    pub documents: Option<u64>,

    /// Average document size in bytes
    #[arg(long, required_unless_present = "file")]
    pub doc_size: Option<u64>,

    /// Workload nature: read, write or readwrite
    #[arg(long, default_value = "read")]
    pub nature: WorkloadNature,

    /// Send the request to the sizer service instead of sizing locally
    #[arg(long)]
    pub remote: bool,
}

impl EstimateArgs {
    fn source(&self) -> Result<RequestSource> {
        if let Some(path) = &self.file {
            return Ok(RequestSource::File(path.clone()));
        }
        match (self.documents, self.doc_size) {
            (Some(documents), Some(doc_size)) => Ok(RequestSource::Flags {
                documents,
                doc_size,
                nature: self.nature,
            }),
            _ => anyhow::bail!("--documents and --doc-size are required without --file"),
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run(Cli::parse()).await {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = config::Config::load()?;
    let format = config.format(cli.format)?;

    if cli.verbose {
        tracing_subscriber::fmt()
            .compact()
            .with_writer(std::io::stderr)
            .with_env_filter("debug")
            .init();
    }

    let mut builder = SizingEngine::builder();
    if let Some(model) = &cli.model {
        builder = builder.model_version(model.parse::<ModelVersion>()?);
    }
    builder = if cli.verbose {
        builder.observer(Arc::new(TracingObserver::new("cli")))
    } else {
        builder.observer(Arc::new(NoopObserver))
    };
    let engine = builder.build().context("Failed to build sizing engine")?;

    let remote = match &cli.command {
        Commands::Estimate(args) => args.remote,
        Commands::Catalog { remote } | Commands::Presets { remote } => *remote,
    };
    let client = if remote {
        Some(client::ApiClient::new(&config.api_url(cli.api_url.clone()))?)
    } else {
        None
    };

    match &cli.command {
        Commands::Estimate(args) => {
            estimate::run_estimate(&engine, client.as_ref(), &args.source()?, format).await?;
        }
        Commands::Catalog { .. } => {
            catalog::show_catalog(engine.catalog(), client.as_ref(), format).await?;
        }
        Commands::Presets { .. } => {
            catalog::show_presets(engine.presets(), client.as_ref(), format).await?;
        }
    }

    Ok(())
}
