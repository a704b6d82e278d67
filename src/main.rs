use clap::{Parser, builder::styling};
use crunchbase_connector::{Connector, ConnectorConfig, ConnectorError, Mode, TargetsManifest};
use eyre::{Context, Result};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::process::ExitCode;

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// Crunchbase Connector: pull organization data into partitioned Parquet files
#[derive(Parser)]
#[command(name = "cbconnect", version, styles = STYLES)]
struct Cli {
    /// Resolve targets by name search (specific) or by scanning the ranked catalog (full)
    #[arg(short, long, value_enum, default_value_t = Mode::Specific)]
    mode: Mode,

    /// The dotenv file to source credentials from
    #[arg(short, long, default_value = ".env")]
    env: String,

    /// YAML file listing the target companies, overriding CRUNCHBASE_COMPANIES
    #[arg(short, long)]
    targets: Option<PathBuf>,

    /// Output directory, overriding CRUNCHBASE_OUTPUT_DIR
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// More verbose logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let dotenv = dotenvy::from_filename(&cli.env);

    let log_level = match cli.debug {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    if let Err(e) = dotenv {
        if e.not_found() {
            log::debug!("No dotenv file at {}", cli.env.bright_black());
        } else {
            log::error!("Failed to load {}: {}", cli.env, e);
            return ExitCode::from(2);
        }
    }

    match run(cli).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            let code = ConnectorError::find(&e).map_or(1, ConnectorError::exit_code);
            log::debug!("Exiting with code {}: {:#}", code, e);
            ExitCode::from(code as u8)
        }
    }
}

async fn run(cli: Cli) -> Result<usize> {
    // Failures inside the run are logged by the connector itself
    let connector = prepare(&cli).inspect_err(|e| log::error!("Error: {:#}", e))?;
    connector.run(cli.mode).await
}

fn prepare(cli: &Cli) -> Result<Connector> {
    let mut config = ConnectorConfig::from_env()?;

    if let Some(path) = &cli.targets {
        let manifest = TargetsManifest::read(path)
            .with_context(|| format!("Failed to load targets from {}", path.display()))?;
        log::info!(
            "Loaded {} target(s) from {}",
            manifest.count(),
            path.display().bright_black()
        );
        config = config.with_targets(manifest.companies);
    }
    if let Some(output) = &cli.output {
        config = config.with_destination(output);
    }

    log::info!(
        "Extracting {} company(ies) in {} mode to {}",
        config.targets.len(),
        cli.mode.cyan(),
        config.destination.display().bright_black()
    );

    Connector::try_new(config)
}
