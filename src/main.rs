use anyhow::{Context, bail};
use api_client::{AnalysisGateway, HttpGateway};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use configuration::{Config, LogFormat, load_config};
use core_types::{AnalysisInput, CorrelationMatrix, TimeSeries, UploadFile};
use engine::{PipelineOutcome, Workspace, WorkspaceView};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// The main entry point for the Coincidence Finder command-line client.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up COINCIDENCE__* overrides from a .env file, if there is one.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    // The guard flushes the log file on drop; keep it until main returns.
    let _guard = configuration::init_tracing(&config.logging)?;

    let gateway = HttpGateway::new(&config.gateway)?;
    tracing::debug!(base_url = %gateway.base_url(), "Gateway configured.");

    // Execute the appropriate command
    match cli.command {
        Commands::Analyze(args) => handle_analyze(args, &config, gateway).await,
        Commands::Health(args) => handle_health(args, &gateway).await,
        Commands::Sessions(args) => handle_sessions(args, &gateway).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Finds correlations between a custom dataset and a stock's price history.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (defaults to ./coincidence.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides the configured log output format.
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a CSV dataset, correlate it with a stock and show the results.
    Analyze(AnalyzeArgs),
    /// Check that the analysis service is reachable.
    Health(OutputArgs),
    /// List the sessions currently held by the analysis service.
    Sessions(OutputArgs),
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// The CSV file to upload.
    #[arg(long)]
    file: PathBuf,

    /// The stock ticker to compare against (e.g., "AAPL"). Defaults to the configured symbol.
    #[arg(long)]
    symbol: Option<String>,

    /// First day of the analysis window (format: YYYY-MM-DD).
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day of the analysis window (format: YYYY-MM-DD).
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Variables to chart, comma separated. Charts are skipped when omitted.
    #[arg(long, value_delimiter = ',')]
    select: Vec<String>,
}

#[derive(Parser)]
struct OutputArgs {
    /// Print the raw report as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

// ==============================================================================
// Analyze Command Logic
// ==============================================================================

/// Runs the pipeline for one file and, if asked, the chart refresh for a selection.
async fn handle_analyze(args: AnalyzeArgs, config: &Config, gateway: HttpGateway) -> anyhow::Result<()> {
    let file = read_upload(&args.file).await?;
    let symbol = args
        .symbol
        .unwrap_or_else(|| config.defaults.stock_symbol.clone());
    let input = AnalysisInput::new(symbol)
        .with_file(file)
        .with_dates(args.from, args.to);

    let workspace = Workspace::new(Arc::new(gateway), config.refresh.clone());

    let progress = new_spinner("Uploading and analyzing...")?;
    let outcome = workspace.start_pipeline(input).await;
    progress.finish_and_clear();

    match outcome {
        PipelineOutcome::Completed { session_id, variables } => {
            println!("Session {} ready with {} variables.", session_id, variables);
        }
        PipelineOutcome::Failed(error) => bail!(error),
        PipelineOutcome::Superseded => bail!("The analysis was superseded by another run."),
    }

    let view = workspace.view();
    print_findings(&view);
    print_catalog(&view);

    if args.select.is_empty() {
        return Ok(());
    }

    workspace.clear_selection();
    for name in &args.select {
        if !workspace.toggle_variable(name.trim()) {
            eprintln!("Skipping unknown variable '{}'.", name.trim());
        }
    }

    let progress = new_spinner("Computing charts...")?;
    let view = workspace.settled().await;
    progress.finish_and_clear();

    if let Some(error) = &view.status.error {
        eprintln!("{}", error);
    }
    match (&view.matrix, &view.time_series) {
        (None, None) => println!(
            "Select at least {} known variables to compute charts.",
            config.refresh.min_variables
        ),
        (matrix, series) => {
            if let Some(matrix) = matrix {
                print_matrix(matrix);
            }
            if let Some(series) = series {
                print_series(series);
            }
        }
    }

    Ok(())
}

async fn read_upload(path: &Path) -> anyhow::Result<UploadFile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.csv".to_string());
    Ok(UploadFile::new(name, bytes))
}

fn new_spinner(message: &'static str) -> anyhow::Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed}] {msg}")?);
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

fn print_findings(view: &WorkspaceView) {
    if view.findings.is_empty() {
        println!("No stock correlations found.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec!["Stock", "Variable", "r", "p-value", "n", "Significant"]);
    for f in &view.findings {
        table.add_row(vec![
            f.stock_variable.clone(),
            f.custom_variable.clone(),
            format!("{:.3}", f.correlation),
            format!("{:.4}", f.p_value),
            f.n_observations.to_string(),
            if f.significant { "yes" } else { "no" }.to_string(),
        ]);
    }
    println!("{table}");
}

fn print_catalog(view: &WorkspaceView) {
    let mut table = Table::new();
    table.set_header(vec!["Variable", "Selected"]);
    for name in view.catalog.all() {
        let mark = if view.catalog.is_selected(name) { "x" } else { "" };
        table.add_row(vec![name.as_str(), mark]);
    }
    println!("{table}");
}

fn print_matrix(matrix: &CorrelationMatrix) {
    let mut table = Table::new();
    let mut header = vec![String::new()];
    header.extend(matrix.columns().iter().cloned());
    table.set_header(header);
    for (name, row) in matrix.columns().iter().zip(matrix.values()) {
        let mut cells = vec![name.clone()];
        cells.extend(row.iter().map(|v| format!("{:.2}", v)));
        table.add_row(cells);
    }
    println!("{table}");
}

fn print_series(series: &TimeSeries) {
    let mut table = Table::new();
    table.set_header(vec!["Series", "Points", "From", "To", "Last value"]);
    for s in series.series() {
        let last = s
            .y
            .iter()
            .rev()
            .find_map(|v| *v)
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            s.name.clone(),
            s.x.len().to_string(),
            s.x.first().cloned().unwrap_or_default(),
            s.x.last().cloned().unwrap_or_default(),
            last,
        ]);
    }
    println!("{table}");
}

// ==============================================================================
// Read-only Commands
// ==============================================================================

async fn handle_health(args: OutputArgs, gateway: &HttpGateway) -> anyhow::Result<()> {
    let report = gateway.health().await.context("Health check failed")?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    let mut table = Table::new();
    table.set_header(vec!["Status", "Timestamp", "Active sessions"]);
    table.add_row(vec![
        report.status,
        report.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        report.active_sessions.to_string(),
    ]);
    println!("{table}");
    Ok(())
}

async fn handle_sessions(args: OutputArgs, gateway: &HttpGateway) -> anyhow::Result<()> {
    let sessions = gateway
        .list_sessions()
        .await
        .context("Failed to list sessions")?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }
    if sessions.is_empty() {
        println!("No active sessions.");
        return Ok(());
    }
    let mut table = Table::new();
    table.set_header(vec!["Session", "Created", "Last accessed", "Rows", "Columns", "Date column"]);
    for s in sessions {
        table.add_row(vec![
            s.session_id.to_string(),
            s.created_at.format("%Y-%m-%d %H:%M").to_string(),
            s.last_accessed.format("%Y-%m-%d %H:%M").to_string(),
            s.total_rows.to_string(),
            s.total_columns.to_string(),
            s.date_column,
        ]);
    }
    println!("{table}");
    Ok(())
}
