//! Shared types, error model, and configuration for CorpusMill.
//!
//! This crate is the foundation depended on by all other CorpusMill crates.
//! It provides:
//! - [`CorpusMillError`] — the unified error type
//! - Domain types ([`Record`], [`FieldKind`], [`scalar_to_text`])
//! - Harvester configuration ([`HarvestConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    CONFIG_FILE_NAME, HarvestConfig, InputsConfig, SearchConfig, load_config, load_config_from,
};
pub use error::{CorpusMillError, Result};
pub use types::{FieldKind, Record, scalar_to_text};
