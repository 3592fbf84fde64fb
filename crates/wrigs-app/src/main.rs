// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Wrigs Fashion — sketch clean-up and printable paper dolls.
//
// Entry point. Initialises logging, loads configuration, and runs one
// command against the service layer, printing the result as JSON.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use wrigs_app::AppServices;
use wrigs_core::error::WrigsError;
use wrigs_core::human_errors::humanize_error;
use wrigs_core::{BodyType, PaperSize, PlacementData, Pose};

/// Clean up sketch photos and turn them into printable paper dolls.
#[derive(Parser, Debug)]
#[command(name = "wrigs", version, arg_required_else_help = true)]
struct Cli {
    /// Configuration file (JSON). Defaults to config.json in the data directory.
    #[arg(long, global = true, env = "WRIGS_CONFIG")]
    config: Option<PathBuf>,

    /// Override the static directory that uploads and PDFs are written under.
    #[arg(long, global = true, env = "WRIGS_STATIC_DIR")]
    static_dir: Option<PathBuf>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "WRIGS_VERBOSE")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalise a sketch photo into original and cleaned PNGs.
    Upload {
        /// JPG, PNG or HEIC file.
        file: PathBuf,

        /// Declared MIME type. When omitted the file extension decides.
        #[arg(long, default_value = "")]
        mime: String,
    },

    /// Render the two-page paper-doll PDF.
    Pdf {
        /// Template id, e.g. pose-a-average.
        #[arg(long)]
        template: String,

        /// Cleaned design: a local file, or a site URL such as /uploads/{id}-cleaned.png.
        #[arg(long)]
        design: String,

        /// Outfit category: top, bottom, dress or shoes.
        #[arg(long, default_value = "top")]
        category: String,

        /// Paper size: letter or a4. Defaults to the configured size.
        #[arg(long)]
        paper: Option<String>,
    },

    /// List the doll templates.
    Templates {
        /// pose-a or pose-b.
        #[arg(long)]
        pose: Option<String>,

        /// average, curvy or petite.
        #[arg(long)]
        body_type: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    tracing::info!("Wrigs Fashion starting");

    let services = build_services(&cli)?;

    match cli.command {
        Command::Upload { file, mime } => {
            let data = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let filename = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let uploaded = services
                .uploads()
                .upload(data, &filename, &mime)
                .await
                .map_err(explain)?;
            print_json(&uploaded)?;
        }

        Command::Pdf {
            template,
            design,
            category,
            paper,
        } => {
            let paper_size = paper.as_deref().map(PaperSize::from_request);
            let placement = PlacementData::for_category(category);
            let paper_dolls = services.paper_dolls();
            let generated = if Path::new(&design).is_file() {
                paper_dolls
                    .generate_from_path(&template, Path::new(&design), placement, paper_size)
                    .await
            } else {
                paper_dolls
                    .generate(&template, &design, placement, paper_size)
                    .await
            };
            print_json(&generated.map_err(explain)?)?;
        }

        Command::Templates { pose, body_type } => {
            let pose = match pose.as_deref() {
                Some(raw) => match Pose::parse(raw) {
                    Some(pose) => Some(pose),
                    None => bail!("Unknown pose {raw:?} (expected pose-a or pose-b)"),
                },
                None => None,
            };
            let body_type = match body_type.as_deref() {
                Some(raw) => match BodyType::parse(raw) {
                    Some(body_type) => Some(body_type),
                    None => bail!("Unknown body type {raw:?} (expected average, curvy or petite)"),
                },
                None => None,
            };
            print_json(&services.paper_dolls().templates(pose, body_type))?;
        }
    }

    Ok(())
}

fn build_services(cli: &Cli) -> Result<AppServices> {
    let mut config = AppServices::load_config(cli.config.as_deref()).map_err(explain)?;
    if let Some(static_dir) = &cli.static_dir {
        config.static_dir = static_dir.clone();
    }
    Ok(AppServices::from_config(config))
}

/// Attach the plain-English explanation to a service error.
fn explain(err: WrigsError) -> anyhow::Error {
    let human = humanize_error(&err);
    let kind = err.kind();
    anyhow::Error::new(err).context(format!("{} {} [{kind}]", human.message, human.suggestion))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialise output")?;
    println!("{json}");
    Ok(())
}
