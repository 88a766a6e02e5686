// ============================================================
// Layer 4 - Text Line Datasets
// ============================================================
// Implements Burn's Dataset trait over plain text files, one
// sentence per line.
//
//   TextLineDataset      one file  -> Dataset<String>
//   ParallelTextDataset  two files -> Dataset<(String, String)>
//
// Parallel files are zipped line by line. If one file is longer
// the extra lines are ignored: the shorter file bounds the
// dataset, and a warning is logged because that almost always
// means the corpus is misaligned.
//
// Reference: Burn Book §4 (Datasets)

use anyhow::{Context, Result};
use burn::data::dataset::Dataset;
use std::{fs, path::Path};

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read text file '{}'", path.display()))?;
    Ok(text.lines().map(str::to_string).collect())
}

// ─── TextLineDataset ──────────────────────────────────────────────────────────
pub struct TextLineDataset {
    lines: Vec<String>,
}

impl TextLineDataset {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path  = path.as_ref();
        let lines = read_lines(path)?;
        tracing::debug!("Read {} lines from '{}'", lines.len(), path.display());
        Ok(Self::new(lines))
    }
}

impl Dataset<String> for TextLineDataset {
    fn get(&self, index: usize) -> Option<String> {
        self.lines.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.lines.len()
    }
}

// ─── ParallelTextDataset ──────────────────────────────────────────────────────
pub struct ParallelTextDataset {
    source: TextLineDataset,
    target: TextLineDataset,
}

impl ParallelTextDataset {
    pub fn new(source: TextLineDataset, target: TextLineDataset) -> Self {
        if source.len() != target.len() {
            tracing::warn!(
                "Parallel files differ in length ({} vs {} lines); using the first {}",
                source.len(),
                target.len(),
                source.len().min(target.len())
            );
        }
        Self { source, target }
    }

    pub fn open(src_path: impl AsRef<Path>, tgt_path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(
            TextLineDataset::open(src_path)?,
            TextLineDataset::open(tgt_path)?,
        ))
    }
}

impl Dataset<(String, String)> for ParallelTextDataset {
    fn get(&self, index: usize) -> Option<(String, String)> {
        Some((self.source.get(index)?, self.target.get(index)?))
    }

    fn len(&self) -> usize {
        self.source.len().min(self.target.len())
    }
}

/// Turn a dataset into an owning iterator over its items in index order.
pub fn into_stream<D, I>(dataset: D) -> impl Iterator<Item = I>
where
    D: Dataset<I>,
{
    (0..dataset.len()).filter_map(move |i| dataset.get(i))
}
