use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use wine_report::config::Config;
use wine_report::logging;
use wine_report::pipeline;

#[derive(Parser)]
#[command(name = "wine_report")]
#[command(about = "Brazilian wine export market report generator")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML run configuration
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate all configured datasets without writing a report
    Validate,
    /// Run the full pipeline and write the report
    Report,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Validate => {
            println!("🔍 Validating datasets...");
            match pipeline::loader::load_datasets(&config.inputs, &config.analysis) {
                Ok(datasets) => {
                    println!("\n📊 Datasets loaded:");
                    println!("   Export records:      {}", datasets.exports.len());
                    println!("   Climate records:     {}", datasets.climate.len());
                    println!("   Demographic records: {}", datasets.demographics.len());
                    println!("   Economic records:    {}", datasets.economics.len());
                    println!("   Rating records:      {}", datasets.ratings.len());
                    println!("✅ All datasets valid");
                }
                Err(e) => {
                    error!("Dataset validation failed: {}", e);
                    println!("❌ Validation failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Report => {
            println!("🍷 Generating wine export report...");
            match pipeline::run(&config) {
                Ok(result) => {
                    info!("Report run finished");
                    println!("\n📊 Report Results:");
                    println!("   Records loaded:   {}", result.records_loaded);
                    println!("   Sections written: {}", result.sections_written);
                    println!("   Output file:      {}", result.output_path.display());
                    if let Some(summary) = &result.summary_path {
                        println!("   JSON summary:     {}", summary.display());
                    }
                    println!("✅ Report generated successfully");
                }
                Err(e) => {
                    error!("Report generation failed: {}", e);
                    println!("❌ Report generation failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
    Ok(())
}
