// ============================================================
// Layer 2 - InspectUseCase
// ============================================================
// Builds one of the two pipelines exactly as a training or
// inference driver would, then walks a single pass and reports
// what it produced:
//
//   Step 1: Load hparams            (Layer 3 - domain)
//   Step 2: Load vocabularies       (Layer 6 - infra)
//   Step 3: Build the pipeline      (Layer 4 - data)
//   Step 4: initialize + get_next   (Layer 4 - data)
//   Step 5: Log per-batch stats     (Layer 6 - infra)
//
// Tensors live on the CPU NdArray backend; nothing here needs
// a GPU.

use anyhow::{bail, Result};
use burn::{backend::NdArray, prelude::Backend};
use std::sync::Arc;

use crate::data::{
    batcher::Batch,
    pipeline::{get_infer_input, get_input, BatchedInput},
};
use crate::domain::{
    hparams::{HParams, InputOptions, Mode},
    traits::VocabLookup,
};
use crate::infra::{
    batch_report::BatchReport,
    vocab_store::load_vocab,
};

type InspectBackend = NdArray;

// ─── Configuration ────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct InspectConfig {
    pub mode:         Mode,
    pub src_file:     String,
    /// Required for train/eval
    pub tgt_file:     Option<String>,
    pub src_vocab:    String,
    /// Falls back to the source vocabulary when absent
    pub tgt_vocab:    Option<String>,
    /// JSON hparams; defaults are used when absent
    pub hparams_file: Option<String>,
    /// Id for tokens missing from a vocabulary
    pub unk_id:       u32,
    pub options:      InputOptions,
    /// Stop after this many batches
    pub max_batches:  Option<usize>,
    /// Write batch_report.csv here
    pub report_dir:   Option<String>,
}

/// Totals over the batches that were pulled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InspectSummary {
    pub batches:      usize,
    pub rows:         usize,
    pub src_tokens:   usize,
    pub padded_cells: usize,
}

impl InspectSummary {
    pub fn pad_fraction(&self) -> f64 {
        if self.padded_cells == 0 {
            return 0.0;
        }
        1.0 - self.src_tokens as f64 / self.padded_cells as f64
    }
}

// ─── InspectUseCase ───────────────────────────────────────────────────────────
pub struct InspectUseCase {
    config: InspectConfig,
}

impl InspectUseCase {
    pub fn new(config: InspectConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<InspectSummary> {
        let cfg = &self.config;

        let hparams = match &cfg.hparams_file {
            Some(path) => HParams::from_json_file(path)?,
            None       => HParams::default(),
        };

        let src_vocab = load_vocab(&cfg.src_vocab, cfg.unk_id)?;
        let mut input = self.build(&hparams, src_vocab)?;

        let report = cfg
            .report_dir
            .as_ref()
            .map(BatchReport::create)
            .transpose()?;

        input.initialize()?;

        let mut summary = InspectSummary::default();
        while let Some(batch) = next_within_limit(&mut input, summary.batches, cfg.max_batches)? {
            let stats = batch.stats(summary.batches + 1);
            tracing::debug!(
                "Batch {}: rows={} src_width={} tgt_width={:?} pad={:.3}",
                stats.batch,
                stats.rows,
                stats.src_width,
                stats.tgt_width,
                stats.pad_fraction()
            );

            if let Some(report) = &report {
                report.log(&stats)?;
            }

            summary.batches      += 1;
            summary.rows         += stats.rows;
            summary.src_tokens   += stats.src_tokens;
            summary.padded_cells += stats.rows * stats.src_width;
        }

        tracing::info!(
            "{} pass: {} batches, {} sentences, source padding {:.1}%",
            input.mode(),
            summary.batches,
            summary.rows,
            summary.pad_fraction() * 100.0
        );
        if let Some(report) = &report {
            tracing::info!("Batch report written to '{}'", report.csv_path().display());
        }
        Ok(summary)
    }

    fn build(
        &self,
        hparams:   &HParams,
        src_vocab: Arc<dyn VocabLookup>,
    ) -> Result<BatchedInput<InspectBackend>> {
        let cfg    = &self.config;
        let device = Default::default();

        if !cfg.mode.has_targets() {
            return get_infer_input::<InspectBackend>(hparams, &cfg.src_file, src_vocab, device);
        }

        let Some(tgt_file) = &cfg.tgt_file else {
            bail!("{} mode needs a target file", cfg.mode);
        };

        let tgt_vocab = match &cfg.tgt_vocab {
            Some(path) => load_vocab(path, cfg.unk_id)?,
            None => {
                tracing::info!("No target vocabulary given; sharing the source vocabulary");
                Arc::clone(&src_vocab)
            }
        };

        get_input::<InspectBackend>(
            hparams,
            cfg.mode,
            &cfg.src_file,
            tgt_file,
            src_vocab,
            tgt_vocab,
            &cfg.options,
            device,
        )
    }
}

/// Pull the next batch unless `max` batches have already been taken.
/// At the limit the pipeline is not advanced, so no batch is built
/// only to be dropped.
fn next_within_limit<B: Backend>(
    input: &mut BatchedInput<B>,
    taken: usize,
    max:   Option<usize>,
) -> Result<Option<Batch<B>>> {
    if max.is_some_and(|max| taken >= max) {
        return Ok(None);
    }
    input.get_next()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, body: &str) -> String {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn config(dir: &TempDir, mode: Mode) -> InspectConfig {
        let hparams = write(dir, "hparams.json", r#"{"batch_size": 2, "infer_batch_size": 3, "num_buckets": 1, "random_seed": 5}"#);
        InspectConfig {
            mode,
            src_file:     write(dir, "train.en", "the cat\na dog runs\n\nhello\n"),
            tgt_file:     Some(write(dir, "train.de", "die katze\nein hund\nleer\nhallo\n")),
            src_vocab:    write(dir, "vocab.txt", "<unk>\n<s>\n</s>\nthe\ncat\na\ndog\n"),
            tgt_vocab:    None,
            hparams_file: Some(hparams),
            unk_id:       0,
            options:      InputOptions::default(),
            max_batches:  None,
            report_dir:   None,
        }
    }

    #[test]
    fn test_train_pass_drops_empty_pair() {
        let dir     = tempfile::tempdir().unwrap();
        let summary = InspectUseCase::new(config(&dir, Mode::Train)).execute().unwrap();

        assert_eq!(summary.rows, 3);
        assert_eq!(summary.batches, 2);
    }

    #[test]
    fn test_infer_pass_keeps_every_line() {
        let dir     = tempfile::tempdir().unwrap();
        let summary = InspectUseCase::new(config(&dir, Mode::Infer)).execute().unwrap();

        assert_eq!(summary.rows, 4);
        assert_eq!(summary.batches, 2);
    }

    #[test]
    fn test_max_batches_and_report() {
        let dir = tempfile::tempdir().unwrap();
        let report_dir = dir.path().join("report");

        let cfg = InspectConfig {
            max_batches: Some(1),
            report_dir:  Some(report_dir.to_string_lossy().into_owned()),
            ..config(&dir, Mode::Eval)
        };
        let summary = InspectUseCase::new(cfg).execute().unwrap();
        assert_eq!(summary.batches, 1);

        let csv = fs::read_to_string(report_dir.join("batch_report.csv")).unwrap();
        assert_eq!(csv.lines().count(), 2);
    }

    #[test]
    fn test_zero_max_batches_pulls_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = InspectConfig { max_batches: Some(0), ..config(&dir, Mode::Infer) };
        assert_eq!(InspectUseCase::new(cfg).execute().unwrap(), InspectSummary::default());
    }

    #[test]
    fn test_limit_reached_does_not_advance_pipeline() {
        let dir   = tempfile::tempdir().unwrap();
        let cfg   = config(&dir, Mode::Infer);
        let vocab = load_vocab(&cfg.src_vocab, 0).unwrap();
        let mut input =
            get_infer_input::<InspectBackend>(&HParams::default(), &cfg.src_file, vocab, Default::default())
                .unwrap();

        // Never initialized: any real pull is an error.
        assert!(next_within_limit(&mut input, 2, Some(2)).unwrap().is_none());
        assert!(next_within_limit(&mut input, 1, Some(2)).is_err());

        input.initialize().unwrap();
        assert!(next_within_limit(&mut input, 0, None).unwrap().is_some());
    }

    #[test]
    fn test_train_without_target_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = InspectConfig { tgt_file: None, ..config(&dir, Mode::Train) };
        assert!(InspectUseCase::new(cfg).execute().is_err());
    }
}
