// ============================================================
// Layer 3 - Hyperparameters
// ============================================================
// The configuration surface the pipelines read. Everything here
// is owned by the caller (a training or inference driver) and is
// only read by this crate.
//
// HParams is serialisable so a run can be described by a small
// JSON file; every field has a default so partial files work:
//
//   { "batch_size": 64, "num_buckets": 5, "src_max_len": 50 }
//
// Reference: serde documentation (#[serde(default)])

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

// ─── Mode ────────────────────────────────────────────────────────────────────
/// Which kind of pipeline is being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Train,
    Eval,
    Infer,
}

impl Mode {
    /// Train and eval pipelines carry targets, inference does not
    pub fn has_targets(self) -> bool {
        !matches!(self, Mode::Infer)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Mode::Train => "train",
            Mode::Eval  => "eval",
            Mode::Infer => "infer",
        };
        f.write_str(name)
    }
}

// ─── HParams ─────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HParams {
    /// End-of-sequence token string, also used as the padding token
    pub eos: String,

    /// Start-of-sequence token string, prepended to target inputs
    pub sos: String,

    /// Maximum source tokens kept per sentence (None or 0 = unlimited)
    pub src_max_len: Option<usize>,

    /// Maximum target tokens kept per sentence (None or 0 = unlimited)
    pub tgt_max_len: Option<usize>,

    /// Feed the source sentence to the encoder back to front
    pub source_reverse: bool,

    /// Rows per batch for train/eval pipelines
    pub batch_size: usize,

    /// Rows per batch for the inference pipeline
    pub infer_batch_size: usize,

    /// Number of length buckets; 1 disables bucketing
    pub num_buckets: usize,

    /// Shuffle seed; None draws a fresh seed from the OS
    pub random_seed: Option<u64>,
}

impl Default for HParams {
    fn default() -> Self {
        Self {
            eos:              "</s>".to_string(),
            sos:              "<s>".to_string(),
            src_max_len:      Some(50),
            tgt_max_len:      Some(50),
            source_reverse:   false,
            batch_size:       128,
            infer_batch_size: 32,
            num_buckets:      5,
            random_seed:      None,
        }
    }
}

impl HParams {
    /// Read hyperparameters from a JSON file and validate them
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read hparams from '{}'", path.display()))?;

        let hparams: HParams = serde_json::from_str(&json)
            .with_context(|| format!("Invalid hparams JSON in '{}'", path.display()))?;

        hparams.validate()?;
        tracing::debug!("Loaded hparams from '{}': {:?}", path.display(), hparams);
        Ok(hparams)
    }

    /// Reject settings the pipelines cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("batch_size must be greater than zero");
        }
        if self.infer_batch_size == 0 {
            bail!("infer_batch_size must be greater than zero");
        }
        if self.num_buckets == 0 {
            bail!("num_buckets must be at least 1");
        }
        if self.eos.is_empty() || self.sos.is_empty() {
            bail!("eos and sos tokens must be non-empty");
        }
        Ok(())
    }

    /// Effective source truncation length, treating 0 as unlimited
    pub fn src_max_len(&self) -> Option<usize> {
        self.src_max_len.filter(|&n| n > 0)
    }

    /// Effective target truncation length, treating 0 as unlimited
    pub fn tgt_max_len(&self) -> Option<usize> {
        self.tgt_max_len.filter(|&n| n > 0)
    }
}

// ─── InputOptions ────────────────────────────────────────────────────────────
/// Execution knobs for the train/eval pipeline. These do not change
/// which pairs are produced, only how the work is scheduled
/// (except `skip_count`, which drops leading pairs).
#[derive(Debug, Clone, PartialEq)]
pub struct InputOptions {
    /// Worker threads for the tokenize/lookup map
    pub num_threads: usize,

    /// Shuffle buffer capacity and map chunk size; None = batch_size * 1000
    pub output_buffer_size: Option<usize>,

    /// Number of leading sentence pairs to skip
    pub skip_count: Option<usize>,
}

impl Default for InputOptions {
    fn default() -> Self {
        Self {
            num_threads:        4,
            output_buffer_size: None,
            skip_count:         None,
        }
    }
}

impl InputOptions {
    pub fn buffer_size(&self, batch_size: usize) -> usize {
        self.output_buffer_size
            .filter(|&n| n > 0)
            .unwrap_or(batch_size * 1000)
    }
}
