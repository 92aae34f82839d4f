//! Flag definitions, tracing setup, and the extraction run itself.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;

use corpusmill_dataset::{Dataset, LoadOptions};
use corpusmill_pipeline::{
    FilterOptions, Gate, NormalizeOptions, RecordGate, TextBuilder, normalize, select_columns,
};
use corpusmill_shared::CorpusMillError;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Extract a dataset split into JSONL with only an `input` field.
#[derive(Parser)]
#[command(
    name = "corpus-extract",
    version,
    about = "Extract, normalize, and deduplicate text from a dataset into JSONL.",
    long_about = None,
)]
pub(crate) struct Args {
    /// Dataset file or directory, e.g. data/alpaca or corpus/train.jsonl.
    #[arg(long)]
    pub dataset: String,

    /// Dataset split, e.g. train, validation, test.
    #[arg(long, default_value = "train")]
    pub split: String,

    /// Dataset config name (subdirectory) if needed.
    #[arg(long)]
    pub config: Option<String>,

    /// Comma-separated text columns to concatenate (default: auto-detect).
    #[arg(long)]
    pub cols: Option<String>,

    /// Separator used when concatenating columns.
    #[arg(long, default_value = " ")]
    pub sep: String,

    /// Optional format template, e.g. '{instruction}\n{input}\n{output}'.
    /// Only fields present in the record are usable; the result is still
    /// stored under 'input'.
    #[arg(long)]
    pub template: Option<String>,

    /// Drop rows with fewer characters.
    #[arg(long, default_value_t = 1)]
    pub min_chars: usize,

    /// Drop rows with more characters.
    #[arg(long, default_value_t = 200_000)]
    pub max_chars: usize,

    /// Lowercase normalized text before filtering/dedup.
    #[arg(long)]
    pub lower: bool,

    /// Deduplicate by normalized text.
    #[arg(long)]
    pub dedup: bool,

    /// Max number of rows to write.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Iterate without peeking the schema first.
    #[arg(long)]
    pub streaming: bool,

    /// Accepted for loader parity; local datasets never execute code.
    #[arg(long)]
    pub trust_remote_code: bool,

    /// Output JSONL path.
    #[arg(long)]
    pub out: PathBuf,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match args.verbose {
        0 => "corpusmill=info",
        1 => "corpusmill=debug",
        _ => "corpusmill=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match args.log_format {
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
// Extraction run
// ---------------------------------------------------------------------------

/// Run the extraction end to end.
pub(crate) fn run(args: Args) -> Result<()> {
    let load_opts = LoadOptions {
        split: args.split.clone(),
        config: args.config.clone(),
        streaming: args.streaming,
        trust_remote_code: args.trust_remote_code,
    };
    let dataset = Dataset::load(&args.dataset, &load_opts)?;

    // Column inference failure before processing begins is the one fatal
    // usage error: exit 2 with a diagnostic, as callers script against it.
    let columns = match select_columns(args.cols.as_deref(), dataset.features()) {
        Ok(cols) => cols,
        Err(CorpusMillError::Validation { message }) => {
            eprintln!("{message}");
            std::process::exit(2);
        }
        Err(e) => return Err(e.into()),
    };

    info!(?columns, template = args.template.is_some(), "starting extraction");

    let builder = TextBuilder::new(columns, args.sep.clone(), args.template.clone());
    let norm_opts = NormalizeOptions {
        trim: true,
        squeeze_ws: true,
        lower: args.lower,
    };
    let mut gate = RecordGate::new(FilterOptions {
        min_chars: args.min_chars,
        max_chars: args.max_chars,
        dedup: args.dedup,
        limit: args.limit,
    });

    let file = File::create(&args.out).map_err(|e| CorpusMillError::io(&args.out, e))?;
    let mut out = BufWriter::new(file);

    for record in dataset.records()? {
        let record = record?;

        // A record that produces no text is skipped, never fatal.
        let Some(text) = builder.build(&record) else {
            continue;
        };
        if text.is_empty() {
            continue;
        }

        let normalized = normalize(&text, &norm_opts);
        match gate.admit(&normalized) {
            Gate::Skip => continue,
            Gate::Accept => write_row(&mut out, &normalized)?,
            Gate::AcceptAndStop => {
                write_row(&mut out, &normalized)?;
                break;
            }
        }
    }

    out.flush().map_err(|e| CorpusMillError::io(&args.out, e))?;

    info!(rows = gate.accepted(), out = %args.out.display(), "extraction finished");
    println!("Wrote {} rows to {}", gate.accepted(), args.out.display());
    Ok(())
}

/// Emit one `{"input": ...}` line. UTF-8 as-is, no ASCII escaping.
fn write_row(out: &mut impl Write, text: &str) -> Result<()> {
    let line = serde_json::to_string(&serde_json::json!({ "input": text }))?;
    writeln!(out, "{line}")?;
    Ok(())
}
