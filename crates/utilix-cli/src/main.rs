mod batch;
mod lookup;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use utilix_batch::DEFAULT_OUTPUT_FILE;
use utilix_client::LookupClient;
use utilix_core::{load_aliases, AliasTable, AppConfig};

#[derive(Debug, Parser)]
#[command(name = "utilix")]
#[command(about = "Bulk parcel utility lookups against the UTILIX service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Look up every row of a csv or spreadsheet file and export the results
    Batch {
        /// Input file (.csv, .xlsx, .xlsm, .xlsb, .xls or .ods)
        input: PathBuf,
        /// Output file; .xlsx or .csv
        #[arg(long, short, default_value = DEFAULT_OUTPUT_FILE)]
        output: PathBuf,
        /// Read and normalize the input without calling the service
        #[arg(long)]
        dry_run: bool,
    },
    /// Look up a single parcel and print the service response as JSON
    Lookup {
        /// Assessor parcel number
        #[arg(long)]
        apn: String,
        /// County name
        #[arg(long)]
        county: String,
        /// Street address
        #[arg(long)]
        address: Option<String>,
        /// Two-letter state code; defaults to `UTILIX_DEFAULT_STATE`
        #[arg(long)]
        state: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    // Reads `.env` before the process environment.
    let config = utilix_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Batch {
            input,
            output,
            dry_run,
        } => batch::run_batch(&config, &input, &output, dry_run).await,
        Commands::Lookup {
            apn,
            county,
            address,
            state,
        } => {
            lookup::run_lookup(
                &config,
                apn,
                county,
                address.as_deref(),
                state.as_deref(),
            )
            .await
        }
    }
}

/// Alias table from `UTILIX_ALIASES_PATH`, or the built-in table when unset.
fn resolve_aliases(config: &AppConfig) -> anyhow::Result<AliasTable> {
    match config.aliases_path.as_deref() {
        Some(path) => {
            let table = load_aliases(path)?;
            tracing::info!(path = %path.display(), aliases = table.len(), "loaded column aliases");
            Ok(table)
        }
        None => Ok(AliasTable::default()),
    }
}

/// Builds the HTTP client, failing if the service credentials are not configured.
fn build_client(config: &AppConfig) -> anyhow::Result<LookupClient> {
    let (base_url, token) = config.api_credentials()?;
    LookupClient::new(
        base_url,
        token,
        &config.user_agent,
        config.request_timeout_secs,
        config.connect_timeout_secs,
    )
    .map_err(|e| anyhow::anyhow!("failed to build UTILIX client: {e}"))
}

#[cfg(test)]
mod tests;
