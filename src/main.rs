//! Accident Insights - US traffic accident CSV analysis & report generation.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use accident_insights::pipeline;

/// Batch analysis of a US accident dataset: seven report artifacts plus a
/// cleaned CSV export.
#[derive(Parser, Debug)]
#[command(name = "accident-insights", version, about)]
struct Cli {
    /// Input accident CSV (defaults to the reference dataset filename)
    #[arg(default_value = "US_Accidents_March23.csv")]
    input: PathBuf,

    /// Directory the report artifacts and export are written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    std::fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("creating output directory {}", cli.out_dir.display()))?;

    let summary = pipeline::run(&cli.input, &cli.out_dir)
        .with_context(|| format!("analyzing {}", cli.input.display()))?;

    if let Some(hotspot) = &summary.hotspot {
        println!(
            "✔️ Accident hotspot map saved as '{}'.",
            hotspot.display()
        );
    }
    println!(
        "✔️ Cleaned dataset saved as '{}'.",
        summary.export.display()
    );

    Ok(())
}
