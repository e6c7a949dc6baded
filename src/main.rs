use std::path::PathBuf;
use clap::{Parser, Subcommand};
use product_import::cli_service::CliService;
use product_import::infrastructure::{config::AppConfig, parsers::template::SAMPLE_FILE_NAME};
use tracing::{info, debug};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "product-import")]
#[command(about = "Bulk product import from CSV files", long_about = None)]
#[command(version)]
struct Cli {
    /// YAML configuration file (environment variables take precedence)
    #[arg(long, global = true, env = "PRODUCT_IMPORT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse, validate and upload a product CSV
    Import {
        file: String,

        /// Validate and simulate the upload without calling the backend
        #[arg(long)]
        dry_run: bool,
    },
    /// Parse and validate a product CSV without uploading
    Validate {
        file: String,

        /// Number of valid products to preview
        #[arg(long, default_value = "10")]
        preview: usize,
    },
    /// Write the sample CSV template
    Sample {
        #[arg(long, default_value = SAMPLE_FILE_NAME)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env()
            .add_directive("product_import=info".parse()?)
            .add_directive("reqwest=warn".parse()?))
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("Starting product import");
    debug!("Command: {:?}", cli.command);

    match cli.command {
        Command::Sample { output } => {
            CliService::write_sample(&output).await?;
        }
        Command::Validate { file, preview } => {
            let config = AppConfig::load(cli.config.as_deref())?;
            let service = CliService::new(&config, true)?;
            service.validate(&file, preview).await?;
        }
        Command::Import { file, dry_run } => {
            let config = AppConfig::load(cli.config.as_deref())?;
            let service = CliService::new(&config, dry_run)?;
            let summary = service.import(&file).await?;
            if !summary.upload.failed.is_empty() {
                return Err(format!("{} products failed to upload", summary.upload.failed.len()).into());
            }
        }
    }

    Ok(())
}
