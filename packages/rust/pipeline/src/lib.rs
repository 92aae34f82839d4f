//! Text extraction pipeline: column selection, text building, normalization,
//! and the filter/dedup gate.
//!
//! Data flows strictly forward:
//! column selector → text builder → normalizer → gate → sink.
//! The normalized string is the only state the gate ever sees.

pub mod builder;
pub mod columns;
pub mod filter;
pub mod normalize;

pub use builder::TextBuilder;
pub use columns::{COMMON_TEXT_COLUMNS, parse_columns, select_columns};
pub use filter::{FilterOptions, Gate, RecordGate};
pub use normalize::{NormalizeOptions, normalize};
