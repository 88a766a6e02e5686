// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// Cross-cutting pieces that touch the filesystem but are not
// part of the pipeline logic itself:
//
//   vocab_store.rs  - Vocabulary loading
//                     Reads a plain vocab file (one token per
//                     line) or a HuggingFace tokenizer.json and
//                     exposes it through the VocabLookup trait.
//
//   batch_report.rs - Batch statistics logging
//                     Writes one CSV row per produced batch
//                     (shape, real tokens, padding fraction) so
//                     bucketing settings can be compared.
//
// Reference: Rust Book §9 (Error Handling with anyhow)

/// Vocabulary tables behind the VocabLookup trait
pub mod vocab_store;

/// Per-batch CSV statistics
pub mod batch_report;
