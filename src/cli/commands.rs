// ============================================================
// Layer 1 - CLI Commands and Arguments
// ============================================================
// Two subcommands, one per pipeline:
//
//   batches        train/eval pipeline over parallel files
//   infer-batches  inference pipeline over a source file
//
// clap's derive macros generate --help, error messages for
// missing args and the string -> number conversions.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand, ValueEnum};

use crate::application::inspect_use_case::InspectConfig;
use crate::domain::hparams::{InputOptions, Mode};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the train/eval pipeline and summarise one pass
    Batches(BatchesArgs),

    /// Build the inference pipeline and summarise one pass
    InferBatches(InferArgs),
}

/// Pipeline flavour for the `batches` command
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum PairMode {
    Train,
    Eval,
}

impl From<PairMode> for Mode {
    fn from(m: PairMode) -> Self {
        match m {
            PairMode::Train => Mode::Train,
            PairMode::Eval  => Mode::Eval,
        }
    }
}

/// Flags shared by both commands
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Source text file, one sentence per line
    #[arg(long)]
    pub src: String,

    /// Source vocabulary (vocab file or tokenizer.json)
    #[arg(long)]
    pub src_vocab: String,

    /// Hyperparameters JSON; defaults are used when omitted
    #[arg(long)]
    pub hparams: Option<String>,

    /// Id assigned to tokens that are not in the vocabulary
    #[arg(long, default_value_t = 0)]
    pub unk_id: u32,

    /// Stop after this many batches
    #[arg(long)]
    pub max_batches: Option<usize>,

    /// Directory for batch_report.csv
    #[arg(long)]
    pub report_dir: Option<String>,
}

/// All arguments for the `batches` command
#[derive(Args, Debug)]
pub struct BatchesArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Target text file, line-aligned with --src
    #[arg(long)]
    pub tgt: String,

    /// Target vocabulary; the source vocabulary is shared when omitted
    #[arg(long)]
    pub tgt_vocab: Option<String>,

    #[arg(long, value_enum, default_value_t = PairMode::Train)]
    pub mode: PairMode,

    /// Worker threads for tokenisation and lookup
    #[arg(long, default_value_t = 4)]
    pub num_threads: usize,

    /// Shuffle buffer size (default: batch_size * 1000)
    #[arg(long)]
    pub output_buffer_size: Option<usize>,

    /// Skip this many leading sentence pairs
    #[arg(long)]
    pub skip_count: Option<usize>,
}

impl From<BatchesArgs> for InspectConfig {
    fn from(a: BatchesArgs) -> Self {
        InspectConfig {
            mode:         a.mode.into(),
            src_file:     a.common.src,
            tgt_file:     Some(a.tgt),
            src_vocab:    a.common.src_vocab,
            tgt_vocab:    a.tgt_vocab,
            hparams_file: a.common.hparams,
            unk_id:       a.common.unk_id,
            options: InputOptions {
                num_threads:        a.num_threads,
                output_buffer_size: a.output_buffer_size,
                skip_count:         a.skip_count,
            },
            max_batches:  a.common.max_batches,
            report_dir:   a.common.report_dir,
        }
    }
}

/// All arguments for the `infer-batches` command
#[derive(Args, Debug)]
pub struct InferArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

impl From<InferArgs> for InspectConfig {
    fn from(a: InferArgs) -> Self {
        InspectConfig {
            mode:         Mode::Infer,
            src_file:     a.common.src,
            tgt_file:     None,
            src_vocab:    a.common.src_vocab,
            tgt_vocab:    None,
            hparams_file: a.common.hparams,
            unk_id:       a.common.unk_id,
            options:      InputOptions::default(),
            max_batches:  a.common.max_batches,
            report_dir:   a.common.report_dir,
        }
    }
}
