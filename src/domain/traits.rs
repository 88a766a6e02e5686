// ============================================================
// Layer 3 - Core Traits (Abstractions)
// ============================================================
// The pipelines never care where a vocabulary came from. A plain
// one-token-per-line file and a HuggingFace tokenizer.json both
// answer the same question: "which id does this token have?"
//
//   - VocabTable     implements VocabLookup (vocab file)
//   - TokenizerVocab implements VocabLookup (tokenizer.json)
//
// The pipeline layer only sees Arc<dyn VocabLookup>, so either
// can be passed for the source and target side independently.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

// ─── VocabLookup ──────────────────────────────────────────────────────────────
/// String to id lookup used by the pipelines.
///
/// Lookups are total: tokens that are not in the vocabulary map to
/// the table's default id instead of failing.
///
/// `Send + Sync` because lookups run on the rayon map workers.
pub trait VocabLookup: Send + Sync {
    /// Id of `token`, or the default id when it is unknown
    fn lookup(&self, token: &str) -> u32;

    /// Id returned for unknown tokens
    fn default_id(&self) -> u32;

    /// Number of entries in the vocabulary
    fn len(&self) -> usize;

    /// Look up every token of a sentence, preserving order.
    fn lookup_all(&self, tokens: &[&str]) -> Vec<u32> {
        tokens.iter().map(|t| self.lookup(t)).collect()
    }
}
