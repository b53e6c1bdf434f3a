use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use loan_engine::api::{AppState, create_router};
use loan_engine::batch::{
    BatchSummary, evaluate_all, read_applicants_from_path, write_results_csv, write_results_json,
    write_sample_csv,
};
use loan_engine::calculation::DecisionEngine;
use loan_engine::config::ConfigLoader;
use loan_engine::error::EngineError;
use loan_engine::telemetry::{self, TelemetryError};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "loan-engine",
    about = "Score, price and decide personal loan applications",
    version
)]
struct Cli {
    /// Log level or filter directive (RUST_LOG takes precedence)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service
    Serve(ServeArgs),
    /// Evaluate every applicant in a CSV file
    Batch(BatchArgs),
    /// Print the CSV header and a template row for bulk import
    Sample,
}

#[derive(Args, Debug)]
struct PolicyArgs {
    /// Directory holding the policy YAML files (defaults to the built-in policy)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Reference rate in percent (defaults to the policy's rate)
    #[arg(long)]
    base_rate: Option<Decimal>,
    /// Run the document checklist and pre-sanction visit gates first
    #[arg(long)]
    compliance: bool,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Worker threads for batch requests
    #[arg(long, default_value_t = 4)]
    workers: usize,
    #[command(flatten)]
    policy: PolicyArgs,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// CSV file of applicants
    #[arg(long)]
    input: PathBuf,
    /// Output file (defaults to stdout)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,
    /// Worker threads
    #[arg(long, default_value_t = 4)]
    workers: usize,
    #[command(flatten)]
    policy: PolicyArgs,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("invalid listen address '{0}'")]
    Address(String),
    #[error("base rate must not be negative (got {0})")]
    NegativeBaseRate(Decimal),
    #[error("server error: {0}")]
    Server(#[from] io::Error),
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => {
            telemetry::init(&cli.log_level)?;
            run_server(args).await
        }
        Command::Batch(args) => {
            telemetry::init(&cli.log_level)?;
            run_batch(args)
        }
        Command::Sample => write_sample_csv(io::stdout().lock()).map_err(CliError::from),
    }
}

/// Loads the policy and builds the engine with the effective base rate.
fn build_engine(args: &PolicyArgs) -> Result<(DecisionEngine, Decimal), CliError> {
    let loader = ConfigLoader::load_or_builtin(args.config.as_ref())?;
    let base_rate = args
        .base_rate
        .unwrap_or(loader.metadata().default_base_rate);
    if base_rate < Decimal::ZERO {
        return Err(CliError::NegativeBaseRate(base_rate));
    }

    info!(
        policy = %loader.metadata().code,
        version = %loader.metadata().version,
        %base_rate,
        compliance = args.compliance,
        "policy loaded"
    );

    let policy = loader.into_config();
    let engine = if args.compliance {
        DecisionEngine::with_compliance(policy)
    } else {
        DecisionEngine::new(policy)
    };
    Ok((engine, base_rate))
}

async fn run_server(args: ServeArgs) -> Result<(), CliError> {
    let (engine, base_rate) = build_engine(&args.policy)?;
    let state = AppState::new(engine, base_rate).with_workers(args.workers);
    let app = create_router(state);

    let raw = format!("{}:{}", args.host, args.port);
    let addr: SocketAddr = raw.parse().map_err(|_| CliError::Address(raw.clone()))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(%addr, "loan decision engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_batch(args: BatchArgs) -> Result<(), CliError> {
    let (engine, base_rate) = build_engine(&args.policy)?;

    let outcome = read_applicants_from_path(&args.input)?;
    let decisions = evaluate_all(&engine, &outcome.applicants, base_rate, args.workers);

    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path).map_err(|e| {
            EngineError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            }
        })?)),
        None => Box::new(io::stdout().lock()),
    };

    match args.format {
        OutputFormat::Csv => write_results_csv(writer, &outcome.applicants, &decisions)?,
        OutputFormat::Json => write_results_json(writer, &outcome.applicants, &decisions)?,
    }

    let summary = BatchSummary::new(&outcome, &decisions);
    info!(
        input = %args.input.display(),
        rows_read = summary.rows_read,
        evaluated = summary.evaluated,
        skipped = summary.skipped,
        sanctioned = summary.sanctioned,
        "batch complete"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_batch_args_parse() {
        let cli = Cli::parse_from([
            "loan-engine",
            "batch",
            "--input",
            "applicants.csv",
            "--format",
            "json",
            "--base-rate",
            "9.5",
            "--compliance",
        ]);

        match cli.command {
            Command::Batch(args) => {
                assert_eq!(args.format, OutputFormat::Json);
                assert_eq!(args.policy.base_rate, Some(Decimal::new(95, 1)));
                assert!(args.policy.compliance);
                assert_eq!(args.workers, 4);
            }
            other => panic!("Expected batch command, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_base_rate_rejected() {
        let args = PolicyArgs {
            config: None,
            base_rate: Some(Decimal::new(-1, 0)),
            compliance: false,
        };
        assert!(matches!(
            build_engine(&args),
            Err(CliError::NegativeBaseRate(_))
        ));
    }
}
