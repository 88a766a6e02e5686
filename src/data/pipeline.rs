// ============================================================
// Layer 4 - Input Pipelines
// ============================================================
// Wires the data-layer pieces into the two pipelines a
// translation model consumes.
//
// Inference (get_infer_input):
//
//   src file ─▶ split ─▶ truncate ─▶ lookup ─▶ reverse?
//            ─▶ windows of infer_batch_size (file order)
//            ─▶ Seq2SeqBatcher ─▶ Batch { source, source_len }
//
// Train / eval (get_input):
//
//   src file ┐
//            ├▶ zip ─▶ skip ─▶ shuffle(buffer, seed)
//   tgt file ┘
//      ─▶ [rayon] split ─▶ drop empty ─▶ truncate ─▶ reverse?
//                 ─▶ lookup ─▶ <s>/</s> shift
//      ─▶ group by length bucket, windows of batch_size
//      ─▶ Seq2SeqBatcher ─▶ Batch { source, target_input,
//                                   target_output, lengths }
//
// Nothing is read when a pipeline is built. BatchedInput keeps an
// initializer closure; calling initialize() opens the files and
// starts a fresh pass (shuffle RNG restarted from the seed), and
// get_next() pulls batches until the pass is exhausted.

use anyhow::{anyhow, bail, Result};
use burn::{
    data::{
        dataloader::batcher::Batcher,
        dataset::{transform::PartialDataset, Dataset},
    },
    prelude::*,
};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::data::{
    batcher::{Batch, Seq2SeqBatcher},
    bucketing::{sequential_windows, BucketPolicy, GroupByWindow},
    dataset::{into_stream, ParallelTextDataset, TextLineDataset},
    parallel::{build_pool, ParallelFilterMap},
    preprocessor::{PairEncoder, SourceEncoder},
    shuffle::ShuffleBuffer,
};
use crate::domain::{
    hparams::{HParams, InputOptions, Mode},
    sample::SeqPairSample,
    traits::VocabLookup,
};

/// A started pass over the data
pub type BatchStream<B> = Box<dyn Iterator<Item = Batch<B>>>;

type Initializer<B> = Box<dyn Fn() -> Result<BatchStream<B>>>;

// ─── BatchedInput ─────────────────────────────────────────────────────────────
/// Handle to a pipeline: an initializer plus the current iterator.
pub struct BatchedInput<B: Backend> {
    mode:        Mode,
    initializer: Initializer<B>,
    iterator:    Option<BatchStream<B>>,
}

impl<B: Backend> BatchedInput<B> {
    fn new(mode: Mode, initializer: Initializer<B>) -> Self {
        Self { mode, initializer, iterator: None }
    }

    /// Start (or restart) a pass over the input files.
    pub fn initialize(&mut self) -> Result<()> {
        self.iterator = Some((self.initializer)()?);
        tracing::debug!("Initialized {} pipeline", self.mode);
        Ok(())
    }

    /// Next batch of the current pass; Ok(None) once the pass is done.
    pub fn get_next(&mut self) -> Result<Option<Batch<B>>> {
        let iterator = self
            .iterator
            .as_mut()
            .ok_or_else(|| anyhow!("{} iterator has not been initialized", self.mode))?;
        Ok(iterator.next())
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }
}

// ─── Inference pipeline ───────────────────────────────────────────────────────
/// Build the single-file inference pipeline.
pub fn get_infer_input<B: Backend>(
    hparams:   &HParams,
    src_file:  impl AsRef<Path>,
    src_vocab: Arc<dyn VocabLookup>,
    device:    B::Device,
) -> Result<BatchedInput<B>> {
    hparams.validate()?;

    let src_file: PathBuf = src_file.as_ref().to_path_buf();
    let src_eos_id        = src_vocab.lookup(&hparams.eos);
    let encoder           = SourceEncoder::new(hparams, src_vocab);
    let batcher           = Seq2SeqBatcher::<B>::new(src_eos_id, src_eos_id, device);
    let batch_size        = hparams.infer_batch_size;

    tracing::info!(
        "Inference pipeline: '{}' batch_size={} src_eos_id={}",
        src_file.display(),
        batch_size,
        src_eos_id
    );

    let initializer: Initializer<B> = Box::new(move || {
        let dataset = TextLineDataset::open(&src_file)?;
        let encoder = encoder.clone();
        let batcher = batcher.clone();

        let samples = into_stream(dataset).map(move |line| encoder.encode(&line));
        let batches = sequential_windows(samples, batch_size)
            .map(move |window| batcher.batch(window));

        Ok(Box::new(batches) as BatchStream<B>)
    });

    Ok(BatchedInput::new(Mode::Infer, initializer))
}

// ─── Train / eval pipeline ────────────────────────────────────────────────────
/// Build the paired-file train/eval pipeline.
#[allow(clippy::too_many_arguments)]
pub fn get_input<B: Backend>(
    hparams:   &HParams,
    mode:      Mode,
    src_file:  impl AsRef<Path>,
    tgt_file:  impl AsRef<Path>,
    src_vocab: Arc<dyn VocabLookup>,
    tgt_vocab: Arc<dyn VocabLookup>,
    options:   &InputOptions,
    device:    B::Device,
) -> Result<BatchedInput<B>> {
    hparams.validate()?;
    if !mode.has_targets() {
        bail!("get_input builds train/eval pipelines; use get_infer_input for inference");
    }

    let src_file: PathBuf = src_file.as_ref().to_path_buf();
    let tgt_file: PathBuf = tgt_file.as_ref().to_path_buf();

    let batch_size  = hparams.batch_size;
    let buffer_size = options.buffer_size(batch_size);
    let skip_count  = options.skip_count.unwrap_or(0);
    let seed        = hparams.random_seed;
    let bucketing   = BucketPolicy::from_hparams(hparams);

    let src_eos_id = src_vocab.lookup(&hparams.eos);
    let encoder    = Arc::new(PairEncoder::new(hparams, src_vocab, tgt_vocab));
    let batcher    = Seq2SeqBatcher::<B>::new(src_eos_id, encoder.eos_id(), device);
    let pool       = build_pool(options.num_threads)?;

    tracing::info!(
        "{} pipeline: '{}' / '{}' batch_size={} buckets={:?} buffer={} threads={} skip={}",
        mode,
        src_file.display(),
        tgt_file.display(),
        batch_size,
        bucketing,
        buffer_size,
        options.num_threads,
        skip_count
    );
    tracing::debug!(
        "Special ids: src_eos={} tgt_sos={} tgt_eos={}",
        src_eos_id,
        encoder.sos_id(),
        encoder.eos_id()
    );

    let initializer: Initializer<B> = Box::new(move || {
        let dataset = ParallelTextDataset::open(&src_file, &tgt_file)?;
        let total   = dataset.len();
        if skip_count > total {
            tracing::warn!("skip_count {} exceeds the {} available pairs", skip_count, total);
        }
        let dataset = PartialDataset::new(dataset, skip_count.min(total), total);

        let shuffled = ShuffleBuffer::new(into_stream(dataset), buffer_size, seed);

        let encoder = Arc::clone(&encoder);
        let samples = ParallelFilterMap::new(
            shuffled,
            Arc::clone(&pool),
            buffer_size,
            move |(src, tgt): (String, String)| encoder.encode(&src, &tgt),
        );

        let batcher = batcher.clone();
        let batches: BatchStream<B> = match bucketing {
            Some(policy) => {
                let key = move |s: &SeqPairSample| policy.bucket_id(s.source_len(), s.target_len());
                Box::new(
                    GroupByWindow::new(samples, key, batch_size)
                        .map(move |window| batcher.batch(window)),
                )
            }
            None => Box::new(
                sequential_windows(samples, batch_size).map(move |window| batcher.batch(window)),
            ),
        };

        Ok(batches)
    });

    Ok(BatchedInput::new(mode, initializer))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::batcher::tests::{rows, values, TestBackend};
    use crate::infra::vocab_store::VocabTable;
    use std::fs;
    use tempfile::TempDir;

    // <unk>=0 <s>=1 </s>=2 then one id per letter: a=3 .. j=12
    fn vocab() -> Arc<dyn VocabLookup> {
        let mut tokens = vec!["<unk>".to_string(), "<s>".to_string(), "</s>".to_string()];
        tokens.extend(('a'..='j').map(|c| c.to_string()));
        Arc::new(VocabTable::from_tokens(tokens, 0).unwrap())
    }

    fn write(dir: &TempDir, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    fn hparams() -> HParams {
        HParams {
            src_max_len:      None,
            tgt_max_len:      None,
            batch_size:       2,
            infer_batch_size: 2,
            num_buckets:      1,
            random_seed:      Some(11),
            ..HParams::default()
        }
    }

    fn drain(input: &mut BatchedInput<TestBackend>) -> Vec<Batch<TestBackend>> {
        let mut out = Vec::new();
        while let Some(batch) = input.get_next().unwrap() {
            out.push(batch);
        }
        out
    }

    #[test]
    fn test_get_next_requires_initialize() {
        let dir = tempfile::tempdir().unwrap();
        let src = write(&dir, "src", &["a b"]);

        let mut input =
            get_infer_input::<TestBackend>(&hparams(), &src, vocab(), Default::default()).unwrap();
        assert!(input.get_next().is_err());

        input.initialize().unwrap();
        assert!(input.get_next().unwrap().is_some());
    }

    #[test]
    fn test_missing_file_fails_at_initialize() {
        let mut input = get_infer_input::<TestBackend>(
            &hparams(),
            "/no/such/source.txt",
            vocab(),
            Default::default(),
        )
        .unwrap();
        assert!(input.initialize().is_err());
    }

    #[test]
    fn test_infer_batches_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let src = write(&dir, "src", &["a b c", "d", "e f", "zzz g", "h"]);

        let mut input =
            get_infer_input::<TestBackend>(&hparams(), &src, vocab(), Default::default()).unwrap();
        input.initialize().unwrap();
        let batches = drain(&mut input);

        assert_eq!(batches.len(), 3);
        assert_eq!(rows(&batches[0].source), vec![vec![3, 4, 5], vec![6, 2, 2]]);
        assert_eq!(values(&batches[0].source_sequence_length), vec![3, 1]);
        // unknown token -> 0
        assert_eq!(rows(&batches[1].source), vec![vec![7, 8], vec![0, 9]]);
        assert_eq!(rows(&batches[2].source), vec![vec![10]]);
        assert!(batches.iter().all(|b| b.target_input.is_none()));
    }

    #[test]
    fn test_infer_truncate_and_reverse() {
        let dir = tempfile::tempdir().unwrap();
        let src = write(&dir, "src", &["a b c d"]);

        let h = HParams { src_max_len: Some(3), source_reverse: true, ..hparams() };
        let mut input = get_infer_input::<TestBackend>(&h, &src, vocab(), Default::default()).unwrap();
        input.initialize().unwrap();

        let batch = input.get_next().unwrap().unwrap();
        assert_eq!(rows(&batch.source), vec![vec![5, 4, 3]]);
    }

    #[test]
    fn test_get_input_rejects_infer_mode() {
        let result = get_input::<TestBackend>(
            &hparams(),
            Mode::Infer,
            "src",
            "tgt",
            vocab(),
            vocab(),
            &InputOptions::default(),
            Default::default(),
        );
        assert!(result.is_err());
    }

    fn train_input(
        h:    &HParams,
        src:  &Path,
        tgt:  &Path,
        opts: &InputOptions,
    ) -> BatchedInput<TestBackend> {
        let mut input = get_input::<TestBackend>(
            h,
            Mode::Train,
            src,
            tgt,
            vocab(),
            vocab(),
            opts,
            Default::default(),
        )
        .unwrap();
        input.initialize().unwrap();
        input
    }

    #[test]
    fn test_train_batches_drop_empty_and_shift_targets() {
        let dir = tempfile::tempdir().unwrap();
        let src = write(&dir, "src", &["a b", "", "c", "d e f", "g"]);
        let tgt = write(&dir, "tgt", &["h", "i", "", "j i", "h h h"]);

        let mut input = train_input(&hparams(), &src, &tgt, &InputOptions::default());
        let batches   = drain(&mut input);

        let total: usize = batches.iter().map(Batch::rows).sum();
        assert_eq!(total, 3);

        for batch in &batches {
            let tgt_in  = rows(batch.target_input.as_ref().unwrap());
            let tgt_out = rows(batch.target_output.as_ref().unwrap());
            let tgt_len = values(batch.target_sequence_length.as_ref().unwrap());

            for ((inp, out), len) in tgt_in.iter().zip(&tgt_out).zip(&tgt_len) {
                let len = *len as usize;
                assert_eq!(inp[0], 1);
                // target_output is target_input shifted left with </s> appended
                assert_eq!(&out[..len - 1], &inp[1..len]);
                assert_eq!(out[len - 1], 2);
                // padding is </s>
                assert!(inp[len..].iter().all(|&id| id == 2));
            }
        }
    }

    #[test]
    fn test_padded_width_matches_longest_row() {
        let dir = tempfile::tempdir().unwrap();
        let src = write(&dir, "src", &["a", "a b c d", "a b", "c"]);
        let tgt = write(&dir, "tgt", &["b", "c", "d e f", "g"]);

        let mut input = train_input(&hparams(), &src, &tgt, &InputOptions::default());
        for batch in drain(&mut input) {
            let [_, width] = batch.source.dims();
            let longest = values(&batch.source_sequence_length).into_iter().max().unwrap();
            assert_eq!(width as i64, longest);

            let [_, tgt_width] = batch.target_input.as_ref().unwrap().dims();
            let tgt_longest = values(batch.target_sequence_length.as_ref().unwrap())
                .into_iter()
                .max()
                .unwrap();
            assert_eq!(tgt_width as i64, tgt_longest);
        }
    }

    #[test]
    fn test_same_seed_replays_after_reinitialize() {
        let dir = tempfile::tempdir().unwrap();
        let lines: Vec<String> = (0..40).map(|i| format!("a {}", "b ".repeat(i % 7))).collect();
        let refs: Vec<&str>    = lines.iter().map(String::as_str).collect();
        let src = write(&dir, "src", &refs);
        let tgt = write(&dir, "tgt", &refs);

        let mut input = train_input(&hparams(), &src, &tgt, &InputOptions::default());
        let first: Vec<Vec<Vec<i64>>> = drain(&mut input).iter().map(|b| rows(&b.source)).collect();

        input.initialize().unwrap();
        let second: Vec<Vec<Vec<i64>>> = drain(&mut input).iter().map(|b| rows(&b.source)).collect();

        assert_eq!(first, second);
        assert_eq!(first.iter().map(Vec::len).sum::<usize>(), 40);
    }

    #[test]
    fn test_skip_count_drops_leading_pairs() {
        let dir = tempfile::tempdir().unwrap();
        let src = write(&dir, "src", &["a", "b", "c", "d"]);
        let tgt = write(&dir, "tgt", &["e", "f", "g", "h"]);

        let opts = InputOptions { skip_count: Some(3), ..InputOptions::default() };
        let mut input = train_input(&hparams(), &src, &tgt, &opts);
        let batches   = drain(&mut input);

        assert_eq!(batches.len(), 1);
        assert_eq!(rows(&batches[0].source), vec![vec![6]]);
    }

    #[test]
    fn test_bucketed_batches_share_a_bucket() {
        let dir = tempfile::tempdir().unwrap();
        // short (1 token) and long (9 tokens) sentences interleaved
        let long = "a b c d e f g h i";
        let src  = write(&dir, "src", &["a", long, "b", long, "c", long, "d", long]);
        let tgt  = write(&dir, "tgt", &["e", long, "f", long, "g", long, "h", long]);

        let h = HParams { num_buckets: 2, src_max_len: Some(10), tgt_max_len: None, ..hparams() };
        let policy = BucketPolicy::from_hparams(&h).unwrap();

        let mut input = train_input(&h, &src, &tgt, &InputOptions::default());
        let batches   = drain(&mut input);
        assert_eq!(batches.iter().map(Batch::rows).sum::<usize>(), 8);

        for batch in &batches {
            let src_len = values(&batch.source_sequence_length);
            let tgt_len = values(batch.target_sequence_length.as_ref().unwrap());
            let ids: Vec<u64> = src_len
                .iter()
                .zip(&tgt_len)
                .map(|(&s, &t)| policy.bucket_id(s as usize, t as usize))
                .collect();
            assert!(ids.windows(2).all(|w| w[0] == w[1]), "mixed buckets: {ids:?}");
        }
    }

    #[test]
    fn test_eval_mode_is_a_single_pass() {
        let dir = tempfile::tempdir().unwrap();
        let src = write(&dir, "src", &["a", "b", "c"]);
        let tgt = write(&dir, "tgt", &["d", "e", "f"]);

        let mut input = get_input::<TestBackend>(
            &hparams(),
            Mode::Eval,
            &src,
            &tgt,
            vocab(),
            vocab(),
            &InputOptions::default(),
            Default::default(),
        )
        .unwrap();
        input.initialize().unwrap();

        assert_eq!(input.mode(), Mode::Eval);
        assert_eq!(drain(&mut input).iter().map(Batch::rows).sum::<usize>(), 3);
        assert!(input.get_next().unwrap().is_none());
    }
}
