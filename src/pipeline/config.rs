use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::catalog::index::MAX_SEED_LENGTH;
use crate::matching::scoring::ScoringScheme;
use crate::utils::validation::is_valid_fraction;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Default minimum identity for a hit (fraction)
pub const DEFAULT_MIN_IDENTITY: f64 = 0.90;

/// Default minimum allele coverage for a hit (fraction)
pub const DEFAULT_MIN_COVERAGE: f64 = 0.60;

/// Default overlap fraction above which two hits share a locus
pub const DEFAULT_OVERLAP_FRACTION: f64 = 0.5;

/// Default per-task alignment time limit
pub const DEFAULT_ALIGNMENT_TIMEOUT_MS: u64 = 60_000;

/// Default seed length for the candidate pre-filter.
///
/// Chance matches of a k-mer in a contig of length `n` scale as `n / 4^k`;
/// at 16 a kilobase allele draws about one chance seed per 4 Mb strand.
pub const DEFAULT_SEED_LENGTH: usize = 16;

/// Default distance from a contig end that marks a partial hit as truncated
pub const DEFAULT_EDGE_DISTANCE: usize = 25;

/// What to do with genomes that have more than one contig
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiContigPolicy {
    /// Fail the genome with a malformed-input error
    Reject,
    /// Analyze every contig and record a caveat on the report
    #[default]
    Flag,
}

/// Settings for one prediction run.
///
/// Identity, coverage and overlap are fractions in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    pub min_identity: f64,
    pub min_coverage: f64,
    pub overlap_fraction: f64,
    pub scoring: ScoringScheme,

    /// Worker threads; 0 uses one per core
    pub threads: usize,

    /// Time limit for aligning one allele strand; 0 disables it
    pub alignment_timeout_ms: u64,

    pub seed_length: usize,

    /// Align only alleles sharing a seed with the genome
    pub prefilter: bool,

    pub multi_contig: MultiContigPolicy,
    pub edge_distance: usize,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            min_identity: DEFAULT_MIN_IDENTITY,
            min_coverage: DEFAULT_MIN_COVERAGE,
            overlap_fraction: DEFAULT_OVERLAP_FRACTION,
            scoring: ScoringScheme::default(),
            threads: 0,
            alignment_timeout_ms: DEFAULT_ALIGNMENT_TIMEOUT_MS,
            seed_length: DEFAULT_SEED_LENGTH,
            prefilter: true,
            multi_contig: MultiContigPolicy::default(),
            edge_distance: DEFAULT_EDGE_DISTANCE,
        }
    }
}

impl PredictionConfig {
    /// Load a config from a JSON file; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse and validate a JSON config
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the JSON is invalid or fails validation.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every setting is in range
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("min_identity", self.min_identity),
            ("min_coverage", self.min_coverage),
            ("overlap_fraction", self.overlap_fraction),
        ] {
            if !is_valid_fraction(value) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a fraction between 0 and 1, got {value}"
                )));
            }
        }
        if let Some(problem) = self.scoring.check() {
            return Err(ConfigError::Invalid(problem));
        }
        if self.seed_length == 0 || self.seed_length > MAX_SEED_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "seed_length must be between 1 and {MAX_SEED_LENGTH}, got {}",
                self.seed_length
            )));
        }
        Ok(())
    }

    /// Per-task alignment time limit, if any
    #[must_use]
    pub fn alignment_timeout(&self) -> Option<Duration> {
        (self.alignment_timeout_ms > 0).then(|| Duration::from_millis(self.alignment_timeout_ms))
    }
}
