use std::io;

use clap::Parser;

use pdfshelf::cli::{Cli, Commands};
use pdfshelf::services::catalog_service;
use pdfshelf::services::rename_service;
use pdfshelf::services::thumbnail_service::MagickRasterizer;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config();

    match cli.command {
        Commands::Sync { regen } => {
            let rasterizer = MagickRasterizer::detect()?;
            let report = catalog_service::sync(&config, &rasterizer, regen)?;
            println!(
                "Indexed {} PDFs ({} thumbnails generated, {} failed, {} orphans removed)",
                report.indexed, report.generated, report.failed, report.orphans_removed
            );
        }
        Commands::Rename => {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let mut output = io::stdout();
            rename_service::run(&config, &mut input, &mut output)?;
        }
    }

    Ok(())
}
