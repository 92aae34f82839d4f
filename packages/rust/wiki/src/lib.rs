//! Encyclopedia harvesting: search client, extract cleanup, and the
//! keyword harvest loop.
//!
//! The flow is strictly forward: keyword picker → search client → extract
//! cleaner → acceptance filter → append sink. Requests are sequential with
//! fixed delays; there is no retry or backoff (single-attempt semantics).

pub mod clean;
pub mod client;
pub mod harvest;

pub use clean::{clean_extract, meets_min_length};
pub use client::{Article, WikiClient};
pub use harvest::{
    Harvester, HarvestReporter, HarvestStats, NoopReporter, load_keywords, load_template,
};
