// ============================================================
// Layer 4 - Sentence Preprocessor
// ============================================================
// Turns raw text lines into id sequences.
//
// Steps for a source line (applied in order):
//   1. Split on single spaces into tokens (tabs stay inside tokens)
//   2. Keep at most src_max_len tokens
//   3. Reverse the tokens if source_reverse is set
//   4. Map each token to its vocabulary id (unknown -> default id)
//
// Steps for a source/target pair:
//   1. Split both sides
//   2. Drop the pair if either side has no tokens
//   3. Truncate source and target independently
//   4. Reverse the source if requested (never the target)
//   5. Look up ids in the source / target vocabularies
//   6. Build target_input = <s> + target, target_output = target + </s>
//
// Inference keeps empty lines: every input line must produce
// exactly one output row so translations stay aligned with the
// file they came from.

use std::sync::Arc;

use crate::domain::{
    hparams::HParams,
    sample::{SeqPairSample, SourceSample},
    traits::VocabLookup,
};

/// Split a line on ' ' into tokens. Runs of spaces never produce empty
/// tokens; other whitespace (tabs, NBSP) is part of the token.
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split(' ').filter(|t| !t.is_empty()).collect()
}

// ─── SourceEncoder ────────────────────────────────────────────────────────────
#[derive(Clone)]
pub struct SourceEncoder {
    vocab:   Arc<dyn VocabLookup>,
    max_len: Option<usize>,
    reverse: bool,
}

impl SourceEncoder {
    pub fn new(hparams: &HParams, vocab: Arc<dyn VocabLookup>) -> Self {
        Self {
            vocab,
            max_len: hparams.src_max_len(),
            reverse: hparams.source_reverse,
        }
    }

    /// Encode already-split source tokens
    fn encode_tokens(&self, mut tokens: Vec<&str>) -> Vec<u32> {
        if let Some(max_len) = self.max_len {
            tokens.truncate(max_len);
        }
        if self.reverse {
            tokens.reverse();
        }
        self.vocab.lookup_all(&tokens)
    }

    pub fn encode(&self, line: &str) -> SourceSample {
        SourceSample::new(self.encode_tokens(tokenize(line)))
    }
}

// ─── PairEncoder ──────────────────────────────────────────────────────────────
#[derive(Clone)]
pub struct PairEncoder {
    source:      SourceEncoder,
    tgt_vocab:   Arc<dyn VocabLookup>,
    tgt_max_len: Option<usize>,
    sos_id:      u32,
    eos_id:      u32,
}

impl PairEncoder {
    pub fn new(
        hparams:   &HParams,
        src_vocab: Arc<dyn VocabLookup>,
        tgt_vocab: Arc<dyn VocabLookup>,
    ) -> Self {
        let sos_id = tgt_vocab.lookup(&hparams.sos);
        let eos_id = tgt_vocab.lookup(&hparams.eos);

        Self {
            source: SourceEncoder::new(hparams, src_vocab),
            tgt_vocab,
            tgt_max_len: hparams.tgt_max_len(),
            sos_id,
            eos_id,
        }
    }

    /// Encode a sentence pair, or None if either side is empty.
    pub fn encode(&self, src_line: &str, tgt_line: &str) -> Option<SeqPairSample> {
        let src_tokens     = tokenize(src_line);
        let mut tgt_tokens = tokenize(tgt_line);

        if src_tokens.is_empty() || tgt_tokens.is_empty() {
            return None;
        }

        if let Some(max_len) = self.tgt_max_len {
            tgt_tokens.truncate(max_len);
        }

        let source = self.source.encode_tokens(src_tokens);
        let target = self.tgt_vocab.lookup_all(&tgt_tokens);

        Some(SeqPairSample::new(source, &target, self.sos_id, self.eos_id))
    }

    pub fn sos_id(&self) -> u32 {
        self.sos_id
    }

    pub fn eos_id(&self) -> u32 {
        self.eos_id
    }
}
