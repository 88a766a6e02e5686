// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Plain Rust types that describe what flows through the input
// pipelines: the hyperparameters that shape them, the encoded
// samples they produce, and the vocabulary abstraction they
// consult.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain structs, enums and traits
//
// Keeping the samples free of tensors means the shifting and
// length rules can be unit tested without any backend.
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

/// Pipeline hyperparameters and per-call input options
pub mod hparams;

/// Encoded source / source-target samples
pub mod sample;

/// Core abstractions (traits) that other layers implement
pub mod traits;
