// 🧩 Sequence Parser - groups transactions into recurring sequences
// Partition by description similarity, then find interval-regular runs inside each partition.

use crate::comparison::DEFAULT_SPLITTERS;
use crate::error::{Result, SequenceError};
use crate::sequence::TransactionSequence;
use crate::storage::SequenceStorage;
use crate::transaction::{RawTransaction, Transaction};
use anyhow::Context as AnyhowContext;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Finalized sequences need at least this many members
pub const MINIMUM_TRANSACTIONS: usize = 4;

/// Pairs closer than this many days are never treated as recurring
pub const MINIMUM_INTERVAL: i64 = 4;

/// Tolerance around a sequence's interval, in days
pub const DEFAULT_MARGIN: i64 = 3;

/// Descriptions must score strictly above this to share a partition
pub const SIMILARITY_RATIO: f64 = 0.5;

/// Largest margin a config may ask for, in days
pub const MAXIMUM_MARGIN: i64 = 366;

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Minimum members of a finalized sequence (default: 4)
    pub minimum_transactions: usize,

    /// "4 day rule": smallest accepted pair distance (default: 4)
    pub minimum_interval: i64,

    /// Accepted deviation from the interval in days (default: 3)
    pub margin: i64,

    /// Description similarity threshold, strict (default: 0.5)
    pub similarity_ratio: f64,

    /// Extra description splitters besides whitespace (default: "--", "*")
    pub extra_splits: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            minimum_transactions: MINIMUM_TRANSACTIONS,
            minimum_interval: MINIMUM_INTERVAL,
            margin: DEFAULT_MARGIN,
            similarity_ratio: SIMILARITY_RATIO,
            extra_splits: DEFAULT_SPLITTERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ParserConfig {
    /// Load a config from JSON; absent keys keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read parser config: {:?}", path.as_ref()))?;

        let config: ParserConfig =
            serde_json::from_str(&content).context("Failed to parse parser config JSON")?;

        config
            .validate()
            .with_context(|| format!("Rejected parser config: {:?}", path.as_ref()))?;

        Ok(config)
    }

    /// Check every threshold is within its accepted range
    pub fn validate(&self) -> Result<()> {
        if self.minimum_transactions == 0 {
            return Err(SequenceError::InvalidConfig(
                "minimum_transactions must be at least 1".to_string(),
            ));
        }

        if self.minimum_interval < 0 {
            return Err(SequenceError::InvalidConfig(format!(
                "minimum_interval must not be negative, got {}",
                self.minimum_interval
            )));
        }

        if !(0..=MAXIMUM_MARGIN).contains(&self.margin) {
            return Err(SequenceError::InvalidConfig(format!(
                "margin must be between 0 and {} days, got {}",
                MAXIMUM_MARGIN, self.margin
            )));
        }

        if !(0.0..=1.0).contains(&self.similarity_ratio) {
            return Err(SequenceError::InvalidConfig(format!(
                "similarity_ratio must be between 0 and 1, got {}",
                self.similarity_ratio
            )));
        }

        Ok(())
    }

    /// Builder pattern: override the margin
    pub fn with_margin(mut self, margin: i64) -> Self {
        self.margin = margin;
        self
    }
}

// ============================================================================
// SEQUENCE PARSER
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct SequenceParser {
    config: ParserConfig,
}

impl SequenceParser {
    /// Parser with default thresholds
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        SequenceParser { config }
    }

    /// Find sequences in transactions already known to have similar descriptions.
    ///
    /// Every pair is considered, not only neighbours, so stray transactions
    /// between two recurring ones do not break the chain. A pair joins the
    /// first existing candidate (in creation order) whose interval lies
    /// within the margin of the pair's distance; otherwise it seeds a new
    /// candidate. Candidates are then resolved greedily in creation order:
    /// members claimed by an earlier sequence are removed and the rest are
    /// re-inserted into a clean sequence, which re-checks the interval rule
    /// against the new neighbours.
    pub fn parse_sequences(&self, transactions: &[Transaction]) -> Vec<TransactionSequence> {
        let margin = self.config.margin;
        let minimum = self.config.minimum_transactions;

        let mut candidates: Vec<TransactionSequence> = Vec::new();

        for (i, a) in transactions.iter().enumerate() {
            for b in &transactions[i + 1..] {
                let delta = a.days_until(b);
                if delta < self.config.minimum_interval {
                    continue;
                }

                match candidates
                    .iter_mut()
                    .find(|candidate| (candidate.interval - delta).abs() <= margin)
                {
                    Some(candidate) => {
                        candidate.add_transactions([a, b], margin);
                    }
                    None => {
                        let mut candidate = TransactionSequence::new(delta);
                        candidate.add_transactions([a, b], margin);
                        candidates.push(candidate);
                    }
                }
            }
        }

        debug!(
            transactions = transactions.len(),
            candidates = candidates.len(),
            "Interval candidates collected"
        );

        let mut claimed: HashSet<String> = HashSet::new();
        let mut sequences = Vec::new();

        for candidate in candidates {
            let unclaimed: Vec<&Transaction> = candidate
                .iter()
                .filter(|tx| tx.sequence().is_none() && !claimed.contains(tx.id()))
                .collect();

            if unclaimed.len() < minimum {
                debug!(
                    interval = candidate.interval,
                    unclaimed = unclaimed.len(),
                    "Candidate discarded: too few unclaimed transactions"
                );
                continue;
            }

            let mut clean = TransactionSequence::new(candidate.interval);
            clean.add_transactions(unclaimed.iter().copied(), margin);

            // Removing claimed members can open gaps the pairwise pass never saw
            if clean.len() < unclaimed.len() {
                warn!(
                    interval = candidate.interval,
                    dropped = unclaimed.len() - clean.len(),
                    "Rebuilt sequence dropped transactions that no longer fit the interval"
                );
            }

            if clean.is_empty() || clean.len() < minimum {
                debug!(
                    interval = candidate.interval,
                    kept = clean.len(),
                    "Candidate discarded after rebuild"
                );
                continue;
            }

            clean.set_ownership();
            claimed.extend(clean.iter().map(|tx| tx.id().to_string()));

            debug!(
                interval = clean.interval,
                members = clean.len(),
                "Sequence finalized"
            );
            sequences.push(clean);
        }

        sequences
    }

    /// Build a storage from raw records.
    ///
    /// Repeatedly takes the first remaining transaction as anchor, pulls out
    /// every remaining transaction whose description scores above the
    /// similarity ratio against it, and parses that partition. Similarity is
    /// only checked against the anchor, never between other members.
    pub fn parse_storage(&self, records: &[RawTransaction]) -> Result<SequenceStorage> {
        let mut pool = records
            .iter()
            .map(Transaction::from_raw)
            .collect::<Result<Vec<_>>>()?;

        let mut storage = SequenceStorage::new();
        let mut partitions = 0usize;
        let mut found = 0usize;

        while !pool.is_empty() {
            let anchor = pool[0].description().to_string();
            let mut similar = Vec::new();
            let mut rest = Vec::new();

            // The anchor is scored like everyone else, so a blank anchor
            // fails here, but it joins its own partition whatever the ratio
            for (i, transaction) in pool.into_iter().enumerate() {
                let score = transaction.compare_description(&anchor, &self.config.extra_splits)?;
                let similar_enough = i == 0 || score > self.config.similarity_ratio;

                if similar_enough {
                    similar.push(transaction);
                } else {
                    rest.push(transaction);
                }
            }

            let sequences = self.parse_sequences(&similar);
            debug!(
                anchor = %anchor,
                partition = similar.len(),
                sequences = sequences.len(),
                "Description partition parsed"
            );

            partitions += 1;
            found += sequences.len();
            storage.add_sequences(sequences);
            pool = rest;
        }

        info!(
            records = records.len(),
            partitions,
            sequences = found,
            "Sequence storage built"
        );

        Ok(storage)
    }
}

/// Find sequences with default thresholds and the given margin
pub fn parse_sequences(transactions: &[Transaction], margin: i64) -> Vec<TransactionSequence> {
    SequenceParser::with_config(ParserConfig::default().with_margin(margin)).parse_sequences(transactions)
}

/// Build a storage from raw records with default thresholds
pub fn parse_storage(records: &[RawTransaction]) -> Result<SequenceStorage> {
    SequenceParser::new().parse_storage(records)
}

// ============================================================================
// TESTS
// ============================================================================
