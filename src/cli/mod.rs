// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with clap.
// All work is delegated to Layer 2 (application).
//
//   1. `batches`        - walk the train/eval pipeline
//   2. `infer-batches`  - walk the inference pipeline
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::Commands;

use crate::application::inspect_use_case::{InspectConfig, InspectSummary, InspectUseCase};

#[derive(Parser, Debug)]
#[command(
    name = "nmt-input",
    version,
    about = "Build seq2seq translation input pipelines and inspect the batches they produce."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let config: InspectConfig = match self.command {
            Commands::Batches(args)      => args.into(),
            Commands::InferBatches(args) => args.into(),
        };

        tracing::info!("Inspecting {} pipeline over '{}'", config.mode, config.src_file);

        let summary = InspectUseCase::new(config).execute()?;
        print_summary(&summary);
        Ok(())
    }
}

fn print_summary(s: &InspectSummary) {
    println!("batches:        {}", s.batches);
    println!("sentences:      {}", s.rows);
    println!("source tokens:  {}", s.src_tokens);
    println!("source padding: {:.2}%", s.pad_fraction() * 100.0);
}
