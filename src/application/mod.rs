// ============================================================
// Layer 2 - Application / Use Cases
// ============================================================
// Orchestrates the other layers for the command line.
//
// Rules for this layer:
//   - No pipeline logic here (that's Layer 4)
//   - No argument parsing (that's Layer 1)
//   - Only workflow coordination: load config and vocabularies,
//     build a pipeline, walk it, report what came out

/// Build a pipeline and summarise the batches it produces
pub mod inspect_use_case;
