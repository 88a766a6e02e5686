// ============================================================
// Layer 4 - Padded Batcher
// ============================================================
// Implements Burn's Batcher trait to turn a window of encoded
// samples into Int tensors.
//
// What is a Batcher?
//   A Batcher takes a list of individual samples and stacks
//   them into one tensor per field. A model consumes a whole
//   [batch_size, seq_len] matrix per step instead of one
//   sentence at a time.
//
// Why pad here and not in the preprocessor?
//   Sentences in a window have different lengths, and the
//   window is only known once bucketing has grouped it. Every
//   row is padded to the longest sentence in THAT window (not
//   to a global maximum):
//
//   [ 4 7 9 ]        [ 4 7 9 ]
//   [ 5 ]       ->   [ 5 2 2 ]      (2 = </s> id)
//   [ 8 6 ]          [ 8 6 2 ]
//
// Source rows are padded with the source </s> id, target rows
// with the target </s> id. The true lengths travel alongside in
// 1-D tensors so the model can mask the padding out.
//
// The same batcher handles both pipelines:
//   Vec<SourceSample>  -> Batch with target fields = None
//   Vec<SeqPairSample> -> Batch with every field set
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
    tensor::ElementConversion,
};

use crate::domain::sample::{SeqPairSample, SourceSample};
use crate::infra::batch_report::BatchStats;

// ─── Batch ───────────────────────────────────────────────────────────────────
/// One mini-batch. Target fields are present iff the batch came
/// from a train/eval pipeline.
#[derive(Debug, Clone)]
pub struct Batch<B: Backend> {
    /// Source ids - shape: [batch_size, max_src_len]
    pub source: Tensor<B, 2, Int>,

    /// <s> + target ids - shape: [batch_size, max_tgt_len]
    pub target_input: Option<Tensor<B, 2, Int>>,

    /// target ids + </s> - shape: [batch_size, max_tgt_len]
    // Consumed by the model's loss, never by the inspect CLI.
    #[allow(dead_code)]
    pub target_output: Option<Tensor<B, 2, Int>>,

    /// Unpadded source lengths - shape: [batch_size]
    pub source_sequence_length: Tensor<B, 1, Int>,

    /// Unpadded target lengths (counting <s>) - shape: [batch_size]
    #[allow(dead_code)]
    pub target_sequence_length: Option<Tensor<B, 1, Int>>,
}

impl<B: Backend> Batch<B> {
    pub fn rows(&self) -> usize {
        self.source.dims()[0]
    }

    /// Shape and padding figures, `index` being the 1-based batch number
    pub fn stats(&self, index: usize) -> BatchStats {
        let rows      = self.rows();
        let src_width = self.source.dims()[1];
        let src_tokens: i64 = self
            .source_sequence_length
            .clone()
            .sum()
            .into_scalar()
            .elem::<i64>();

        BatchStats {
            batch: index,
            rows,
            src_width,
            tgt_width: self.target_input.as_ref().map(|t| t.dims()[1]),
            src_tokens: src_tokens.max(0) as usize,
        }
    }
}

/// Flatten `seqs` row-major, padding each row to the longest one.
/// Returns the flat buffer and the padded width.
pub fn pad_to_longest(seqs: &[&[u32]], pad_id: u32) -> (Vec<i32>, usize) {
    let width = seqs.iter().map(|s| s.len()).max().unwrap_or(0);
    let mut flat = Vec::with_capacity(seqs.len() * width);

    for seq in seqs {
        flat.extend(seq.iter().map(|&id| id as i32));
        flat.extend(std::iter::repeat(pad_id as i32).take(width - seq.len()));
    }

    (flat, width)
}

// ─── Seq2SeqBatcher ───────────────────────────────────────────────────────────
#[derive(Clone, Debug)]
pub struct Seq2SeqBatcher<B: Backend> {
    /// Padding id for source rows (source-vocab </s>)
    pub src_pad_id: u32,

    /// Padding id for target rows (target-vocab </s>)
    pub tgt_pad_id: u32,

    pub device: B::Device,
}

impl<B: Backend> Seq2SeqBatcher<B> {
    pub fn new(src_pad_id: u32, tgt_pad_id: u32, device: B::Device) -> Self {
        Self { src_pad_id, tgt_pad_id, device }
    }

    fn padded(&self, seqs: &[&[u32]], pad_id: u32) -> Tensor<B, 2, Int> {
        let (flat, width) = pad_to_longest(seqs, pad_id);
        Tensor::<B, 1, Int>::from_ints(flat.as_slice(), &self.device)
            .reshape([seqs.len(), width])
    }

    fn lengths(&self, lens: impl Iterator<Item = usize>) -> Tensor<B, 1, Int> {
        let lens: Vec<i32> = lens.map(|l| l as i32).collect();
        Tensor::<B, 1, Int>::from_ints(lens.as_slice(), &self.device)
    }
}

impl<B: Backend> Batcher<SourceSample, Batch<B>> for Seq2SeqBatcher<B> {
    fn batch(&self, items: Vec<SourceSample>) -> Batch<B> {
        let sources: Vec<&[u32]> = items.iter().map(|s| s.source.as_slice()).collect();

        Batch {
            source: self.padded(&sources, self.src_pad_id),
            target_input: None,
            target_output: None,
            source_sequence_length: self.lengths(items.iter().map(SourceSample::source_len)),
            target_sequence_length: None,
        }
    }
}

impl<B: Backend> Batcher<SeqPairSample, Batch<B>> for Seq2SeqBatcher<B> {
    fn batch(&self, items: Vec<SeqPairSample>) -> Batch<B> {
        let sources:  Vec<&[u32]> = items.iter().map(|s| s.source.as_slice()).collect();
        let tgt_in:   Vec<&[u32]> = items.iter().map(|s| s.target_input.as_slice()).collect();
        let tgt_out:  Vec<&[u32]> = items.iter().map(|s| s.target_output.as_slice()).collect();

        Batch {
            source: self.padded(&sources, self.src_pad_id),
            target_input: Some(self.padded(&tgt_in, self.tgt_pad_id)),
            target_output: Some(self.padded(&tgt_out, self.tgt_pad_id)),
            source_sequence_length: self.lengths(items.iter().map(SeqPairSample::source_len)),
            target_sequence_length: Some(self.lengths(items.iter().map(SeqPairSample::target_len))),
        }
    }
}
