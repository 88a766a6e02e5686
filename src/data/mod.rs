// ============================================================
// Layer 4 - Data Pipeline
// ============================================================
// This layer handles everything from raw parallel text files
// to padded Int tensor batches.
//
// The train/eval pipeline flows in this order:
//
//   .src / .tgt files
//       │
//       ▼
//   ParallelTextDataset  → zips the two files line by line
//       │
//       ▼
//   ShuffleBuffer        → seeded buffered shuffle
//       │
//       ▼
//   ParallelFilterMap    → runs PairEncoder on a rayon pool
//       │
//       ▼
//   GroupByWindow        → groups pairs by length bucket
//       │
//       ▼
//   Seq2SeqBatcher       → pads each window into tensors
//       │
//       ▼
//   BatchedInput         → initialize() / get_next()
//
// Inference skips the shuffle, the filter and the bucketing.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// Burn Dataset impls over text files
pub mod dataset;

/// Whitespace tokenisation, truncation, lookup and target shift
pub mod preprocessor;

/// Seeded buffered shuffle
pub mod shuffle;

/// Order-preserving filter_map on a rayon pool
pub mod parallel;

/// Length buckets and group-by-window
pub mod bucketing;

/// Implements Burn's Batcher trait with per-batch padding
pub mod batcher;

/// get_infer_input / get_input and the BatchedInput handle
pub mod pipeline;
