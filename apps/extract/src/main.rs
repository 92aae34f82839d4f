//! corpus-extract — load a dataset split, build one text candidate per
//! record, normalize, filter, and write `{"input": ...}` JSONL.

mod cli;

use clap::Parser;
use color_eyre::eyre::Result;

use cli::Args;

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    cli::init_tracing(&args);
    cli::run(args)
}
