// ============================================================
// Layer 6 - Batch Report
// ============================================================
// Records one CSV row per batch produced by a pipeline.
//
// Padding is pure waste: every padded position still flows
// through the encoder/decoder. Comparing the padding fraction
// with and without bucketing is the quickest way to pick
// num_buckets for a corpus.
//
// Output file: <dir>/batch_report.csv
//
//   batch,rows,src_width,tgt_width,src_tokens,pad_fraction
//   1,128,12,14,1403,0.086589
//   2,128,23,25,2871,0.024797

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};

/// Shape and padding figures for one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchStats {
    /// 1-based position of the batch in the epoch
    pub batch: usize,

    /// Number of sentences in the batch
    pub rows: usize,

    /// Padded source width (longest source sentence)
    pub src_width: usize,

    /// Padded target width, absent for inference batches
    pub tgt_width: Option<usize>,

    /// Real (unpadded) source tokens in the batch
    pub src_tokens: usize,
}

impl BatchStats {
    /// Fraction of the source tensor that is padding, in [0, 1]
    pub fn pad_fraction(&self) -> f64 {
        let cells = self.rows * self.src_width;
        if cells == 0 {
            return 0.0;
        }
        1.0 - self.src_tokens as f64 / cells as f64
    }
}

/// Appends BatchStats rows to a CSV file.
pub struct BatchReport {
    csv_path: PathBuf,
}

impl BatchReport {
    /// Create the report, truncating any previous file in `dir`.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create report directory '{}'", dir.display()))?;

        let csv_path = dir.join("batch_report.csv");
        let mut f = fs::File::create(&csv_path)
            .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
        writeln!(f, "batch,rows,src_width,tgt_width,src_tokens,pad_fraction")?;

        tracing::debug!("Created batch report: '{}'", csv_path.display());
        Ok(Self { csv_path })
    }

    pub fn log(&self, s: &BatchStats) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        // Empty column for inference batches
        let tgt_width = s.tgt_width.map(|w| w.to_string()).unwrap_or_default();

        writeln!(
            f,
            "{},{},{},{},{},{:.6}",
            s.batch,
            s.rows,
            s.src_width,
            tgt_width,
            s.src_tokens,
            s.pad_fraction(),
        )?;
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}
