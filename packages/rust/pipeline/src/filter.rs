//! Post-normalization record gate: length filter, optional dedup, and the
//! accepted-count limit, applied in that order.

use std::collections::HashSet;

/// Gate configuration.
#[derive(Debug, Clone)]
pub struct FilterOptions {
    /// Reject records with fewer characters (Unicode scalar values).
    pub min_chars: usize,
    /// Reject records with more characters. Bounds are inclusive.
    pub max_chars: usize,
    /// Suppress exact duplicates of previously accepted normalized text.
    pub dedup: bool,
    /// Stop after this many accepted records.
    pub limit: Option<usize>,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            min_chars: 1,
            max_chars: 200_000,
            dedup: false,
            limit: None,
        }
    }
}

/// Verdict for one normalized record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Emit the record and continue.
    Accept,
    /// Emit the record, then stop: the accepted-count cap is reached.
    AcceptAndStop,
    /// Drop the record and continue.
    Skip,
}

/// Stateful filter applied to each normalized record in sequence.
///
/// The seen-set lives for one run and holds every accepted normalized string
/// when dedup is enabled.
#[derive(Debug)]
pub struct RecordGate {
    opts: FilterOptions,
    seen: HashSet<String>,
    accepted: usize,
}

impl RecordGate {
    pub fn new(opts: FilterOptions) -> Self {
        Self {
            opts,
            seen: HashSet::new(),
            accepted: 0,
        }
    }

    /// Number of records accepted so far.
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    /// Judge one normalized record.
    pub fn admit(&mut self, text: &str) -> Gate {
        if let Some(limit) = self.opts.limit {
            // Callers stop on AcceptAndStop; this guards misuse.
            if self.accepted >= limit {
                return Gate::Skip;
            }
        }

        let len = text.chars().count();
        if len < self.opts.min_chars || len > self.opts.max_chars {
            return Gate::Skip;
        }

        if self.opts.dedup {
            if self.seen.contains(text) {
                return Gate::Skip;
            }
            self.seen.insert(text.to_string());
        }

        self.accepted += 1;
        match self.opts.limit {
            Some(limit) if self.accepted >= limit => Gate::AcceptAndStop,
            _ => Gate::Accept,
        }
    }
}
