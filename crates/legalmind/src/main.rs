//! legalmind - Contract summarizer with a content-addressed summary cache

mod cli;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use legalmind_core::config::{default_data_dir, SummarizerConfig, CONFIG_FILE_NAME};
use legalmind_core::export::{export_records_to_csv, export_records_to_json};
use legalmind_core::{
    AnalyzerConfig, ContractAnalyzer, HttpSummarizer, InputSource, LeadSummarizer,
    SummarizerBackend, SummaryStore,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "legalmind",
    version,
    about = "Contract summarizer with a content-addressed summary cache",
    long_about = "Summarizes legal contract text and caches every summary by the SHA-256\n\
                  fingerprint of the whitespace-normalized input. Re-submitting the same\n\
                  contract returns the stored summary without calling the model again.\n\
                  \n\
                  Examples:\n\
                    legalmind analyze --file lease.txt     # Summarize a text file\n\
                    legalmind analyze --sample             # Summarize the bundled sample\n\
                    legalmind history -n 10                # Last 10 summaries\n\
                    legalmind show 3fa9c2d1                # Full record by fingerprint prefix\n\
                    legalmind export --format csv --output history.csv\n\
                    legalmind web --port 3434              # Browser UI + JSON API\n\
                  \n\
                  Environment Variables:\n\
                    LEGALMIND_DATA_DIR                     # Database and config directory\n\
                    LEGALMIND_CONFIG                       # Config file path\n\
                    LEGALMIND_SUMMARIZER                   # http|lead\n\
                    LEGALMIND_ENDPOINT                     # Inference endpoint base URL\n\
                    LEGALMIND_MODEL, MODEL_NAME            # Summarization model\n\
                    LEGALMIND_API_TOKEN, HF_TOKEN          # Bearer token for the endpoint\n\
                    LEGALMIND_NO_COLOR                     # Disable ANSI colors\n\
                    RUST_LOG                               # Log filter (default: warn)"
)]
struct Cli {
    #[command(subcommand)]
    mode: Mode,

    /// Data directory holding legalmind.db (default: platform data dir)
    #[arg(long, global = true, env = "LEGALMIND_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Config file (default: <data-dir>/config.toml)
    #[arg(long, global = true, env = "LEGALMIND_CONFIG")]
    config: Option<PathBuf>,

    /// Summarizer backend
    #[arg(
        long,
        global = true,
        env = "LEGALMIND_SUMMARIZER",
        value_enum,
        default_value_t = SummarizerKind::Http
    )]
    summarizer: SummarizerKind,

    /// Inference endpoint base URL (overrides config)
    #[arg(long, global = true, env = "LEGALMIND_ENDPOINT")]
    endpoint: Option<String>,

    /// Summarization model (overrides config, falls back to MODEL_NAME)
    #[arg(long, global = true, env = "LEGALMIND_MODEL")]
    model: Option<String>,

    /// API token for the endpoint (overrides config, falls back to HF_TOKEN)
    #[arg(long, global = true, env = "LEGALMIND_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    /// Disable ANSI colors (log-friendly)
    #[arg(long, global = true, env = "LEGALMIND_NO_COLOR")]
    no_color: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SummarizerKind {
    /// Remote inference endpoint from config
    Http,
    /// Offline extractive summarizer
    Lead,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExportFormat {
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Mode {
    /// Summarize a contract (cached by content)
    Analyze {
        #[command(flatten)]
        input: InputArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show recent summaries, newest first
    History {
        /// Number of records (default: history_limit from config)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a stored summary in full
    Show {
        /// Fingerprint or prefix (min 8 chars)
        fingerprint: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print store statistics
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export the full history
    Export {
        #[arg(long, value_enum)]
        format: ExportFormat,
        /// Destination file
        #[arg(long, short = 'o')]
        output: PathBuf,
    },
    /// Run the web interface
    Web {
        /// Port for web server
        #[arg(long, default_value = "3434")]
        port: u16,
    },
    /// Print the effective configuration
    Config,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct InputArgs {
    /// Plain-text contract file (.txt, .md)
    #[arg(long)]
    file: Option<PathBuf>,
    /// Contract text given inline
    #[arg(long)]
    text: Option<String>,
    /// Use the bundled sample contract
    #[arg(long)]
    sample: bool,
}

impl InputArgs {
    fn into_source(self) -> InputSource {
        match (self.file, self.text, self.sample) {
            (Some(path), _, _) => InputSource::File(path),
            (None, Some(text), _) => InputSource::Text(text),
            (None, None, _) => InputSource::Sample,
        }
    }
}

/// Resolved data dir + config shared by every command
struct AppContext {
    data_dir: PathBuf,
    config: AnalyzerConfig,
    summarizer: SummarizerKind,
    no_color: bool,
}

impl AppContext {
    fn from_cli(cli: &Cli) -> Result<Self> {
        let data_dir = cli
            .data_dir
            .clone()
            .or_else(default_data_dir)
            .context("Could not determine data directory (set --data-dir)")?;

        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| data_dir.join(CONFIG_FILE_NAME));
        let mut config = AnalyzerConfig::load(&config_path)
            .with_context(|| format!("Failed to load config: {}", config_path.display()))?;
        apply_summarizer_overrides(&mut config.summarizer, cli, |key| std::env::var(key).ok());
        config.validate().context("Invalid summarizer override")?;

        debug!(data_dir = %data_dir.display(), config = %config_path.display(), "Context resolved");

        Ok(Self {
            data_dir,
            config,
            summarizer: cli.summarizer,
            no_color: cli.no_color,
        })
    }

    fn open_store(&self) -> Result<Arc<SummaryStore>> {
        let store = SummaryStore::open_in_dir(&self.data_dir).with_context(|| {
            format!("Failed to open summary store in {}", self.data_dir.display())
        })?;
        Ok(Arc::new(store))
    }

    fn build_analyzer(&self) -> Result<ContractAnalyzer<SummarizerBackend>> {
        let backend = match self.summarizer {
            SummarizerKind::Http => SummarizerBackend::Http(
                HttpSummarizer::new(&self.config.summarizer)
                    .context("Failed to build HTTP summarizer")?,
            ),
            SummarizerKind::Lead => SummarizerBackend::Lead(LeadSummarizer::new()),
        };

        Ok(ContractAnalyzer::new(self.open_store()?, backend).with_config(&self.config))
    }
}

/// Layer flags (and their `LEGALMIND_*` env vars) over the config file,
/// then the conventional `MODEL_NAME` / `HF_TOKEN` variables. Empty values are ignored.
fn apply_summarizer_overrides(
    config: &mut SummarizerConfig,
    cli: &Cli,
    env: impl Fn(&str) -> Option<String>,
) {
    let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

    if let Some(endpoint) = non_empty(cli.endpoint.clone()) {
        config.endpoint = endpoint;
    }
    if let Some(model) = non_empty(cli.model.clone()).or_else(|| non_empty(env("MODEL_NAME"))) {
        config.model = model;
    }
    if let Some(token) = non_empty(cli.api_token.clone()).or_else(|| non_empty(env("HF_TOKEN"))) {
        config.api_token = Some(token);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.no_color);

    let ctx = AppContext::from_cli(&cli)?;

    match cli.mode {
        Mode::Analyze { input, json } => run_analyze(&ctx, input.into_source(), json).await,
        Mode::History { limit, json } => run_history(&ctx, limit, json),
        Mode::Show { fingerprint, json } => run_show(&ctx, &fingerprint, json),
        Mode::Stats { json } => run_stats(&ctx, json),
        Mode::Export { format, output } => run_export(&ctx, format, output),
        Mode::Web { port } => run_web(&ctx, port).await,
        Mode::Config => run_config(&ctx),
    }
}

fn init_tracing(no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_target(false)
        .init();
}

fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message);
    spinner
}

// ============================================================================
// Command Handlers
// ============================================================================

async fn run_analyze(ctx: &AppContext, source: InputSource, json: bool) -> Result<()> {
    let text = source
        .load()
        .with_context(|| format!("Failed to read {}", source.describe()))?;

    let analyzer = ctx.build_analyzer()?;

    let progress = (!json).then(|| spinner(format!("Summarizing {}...", source.describe())));
    let result = analyzer.analyze(&text).await;
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }

    let analysis = result.context("Analysis failed")?;
    println!("{}", cli::format_analysis(&analysis, json, ctx.no_color));

    Ok(())
}

fn run_history(ctx: &AppContext, limit: Option<usize>, json: bool) -> Result<()> {
    let store = ctx.open_store()?;
    let limit = limit.unwrap_or(ctx.config.history_limit);

    let records = store.list_recent(limit).context("Failed to read history")?;
    println!(
        "{}",
        cli::format_history_table(&records, json, ctx.no_color)
    );

    if !json && !records.is_empty() {
        eprintln!(
            "\nShowing {} of {} summaries",
            records.len(),
            store.count().context("Failed to count records")?
        );
    }

    Ok(())
}

fn run_show(ctx: &AppContext, id: &str, json: bool) -> Result<()> {
    let store = ctx.open_store()?;
    let record = cli::resolve_record(&store, id)?;

    println!("{}", cli::format_record(&record, json));

    Ok(())
}

fn run_stats(ctx: &AppContext, json: bool) -> Result<()> {
    let store = ctx.open_store()?;
    let stats = store.stats().context("Failed to compute stats")?;

    println!("{}", cli::format_stats(&stats, json));

    Ok(())
}

fn run_export(ctx: &AppContext, format: ExportFormat, output: PathBuf) -> Result<()> {
    let store = ctx.open_store()?;
    let records = store.list_all().context("Failed to read history")?;

    match format {
        ExportFormat::Json => export_records_to_json(&records, &output)?,
        ExportFormat::Csv => export_records_to_csv(&records, &output)?,
    }

    println!(
        "✓ Exported {} records to {}",
        records.len(),
        output.display()
    );

    Ok(())
}

async fn run_web(ctx: &AppContext, port: u16) -> Result<()> {
    let progress = spinner("Opening summary store...".to_string());
    let analyzer = ctx.build_analyzer()?;
    let count = analyzer.store().count().context("Failed to count records")?;
    progress.finish_with_message(format!("✓ Ready ({} summaries stored)", count));

    let state = legalmind_web::AppState::new(Arc::new(analyzer), ctx.config.history_limit);

    println!("\n🌐 Web UI + API: http://localhost:{}", port);
    legalmind_web::run(state, port).await
}

fn run_config(ctx: &AppContext) -> Result<()> {
    println!("# data_dir = {}", ctx.data_dir.display());
    println!(
        "# database = {}",
        ctx.data_dir.join(legalmind_core::store::DB_FILE_NAME).display()
    );
    println!(
        "{}",
        ctx.config
            .to_toml()
            .context("Failed to serialize config")?
    );

    Ok(())
}
