//! corpus-harvest — long-running keyword harvester.
//!
//! Reads a keyword list (YAML) and an output record template (first line of
//! a JSONL file), then loops: pick a random keyword, search the encyclopedia
//! API, clean the chosen extract, and append accepted records. Runs until
//! interrupted; Ctrl-C stops the loop after the current keyword.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use corpusmill_shared::{load_config, load_config_from};
use corpusmill_wiki::{
    Harvester, HarvestReporter, HarvestStats, WikiClient, load_keywords, load_template,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Harvest encyclopedia intro sections for a keyword list.
#[derive(Parser)]
#[command(
    name = "corpus-harvest",
    version,
    about = "Continuously harvest cleaned encyclopedia intros into JSONL.",
    long_about = None,
)]
struct Cli {
    /// Path to the config file (default: ./harvest.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// Initialize tracing based on CLI flags.
fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "corpusmill=info",
        1 => "corpusmill=debug",
        _ => "corpusmill=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Running tally
// ---------------------------------------------------------------------------

/// Spinner showing the current keyword and the success/error tally.
struct TallyReporter {
    spinner: ProgressBar,
}

impl TallyReporter {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl HarvestReporter for TallyReporter {
    fn keyword_started(&self, keyword: &str) {
        self.spinner.set_message(format!("Processing: {keyword}"));
    }

    fn keyword_finished(&self, _keyword: &str, _accepted: bool, stats: &HarvestStats) {
        self.spinner.set_message(format!(
            "Success: {} | Errors: {}",
            stats.processed, stats.errors
        ));
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(&cli);

    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    let keywords = load_keywords(&config.inputs.keywords_path)?;
    let template = load_template(&config.inputs.template_path)?;

    println!();
    println!("  Encyclopedia intro harvest");
    println!("  Keywords: {}", keywords.len());
    println!("  Output:   {}", config.inputs.output_path.display());
    println!();

    // Cooperative stop flag, observed once per loop iteration.
    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\nCtrl+C received, stopping after the current keyword...");
                stop.store(true, Ordering::Relaxed);
            }
        });
    }

    let client = WikiClient::new(&config.search.endpoint)?;
    let harvester = Harvester::new(
        client,
        keywords,
        template,
        config.search.clone(),
        config.inputs.output_path.clone(),
    )?;

    info!(endpoint = %config.search.endpoint, "starting harvest");

    let reporter = TallyReporter::new();
    let stats = harvester.run(&stop, &reporter).await;
    reporter.finish();

    println!();
    println!("  Harvest stopped");
    println!("  Processed: {}", stats.processed);
    println!("  Errors:    {}", stats.errors);
    if let Some(rate) = stats.success_rate() {
        println!("  Success rate: {:.1}%", rate * 100.0);
    }
    println!();

    Ok(())
}
