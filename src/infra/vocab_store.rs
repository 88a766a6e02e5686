// ============================================================
// Layer 6 - Vocabulary Store
// ============================================================
// Loads the string -> id tables the pipelines consult.
//
// Two on-disk formats are accepted:
//   vocab.txt       one token per line, id = line number
//   tokenizer.json  HuggingFace tokenizer, looked up with
//                   Tokenizer::token_to_id
//
// Building a vocabulary is somebody else's job; this module only
// reads one. Unknown tokens are not errors: they map to the
// configured default id (usually the <unk> entry, id 0).

use anyhow::{bail, Context, Result};
use std::{collections::HashMap, fs, path::Path, sync::Arc};
use tokenizers::Tokenizer;

use crate::domain::traits::VocabLookup;

/// Open a vocabulary by file extension: `.json` goes through the
/// tokenizers crate, anything else is read as a plain vocab file.
pub fn load_vocab(path: impl AsRef<Path>, default_id: u32) -> Result<Arc<dyn VocabLookup>> {
    let path = path.as_ref();
    let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");

    let vocab: Arc<dyn VocabLookup> = if is_json {
        Arc::new(TokenizerVocab::from_file(path, default_id)?)
    } else {
        Arc::new(VocabTable::from_file(path, default_id)?)
    };

    tracing::info!(
        "Loaded vocabulary '{}' ({} entries, default id {})",
        path.display(),
        vocab.len(),
        vocab.default_id()
    );
    Ok(vocab)
}

// ─── VocabTable ───────────────────────────────────────────────────────────────
/// In-memory table built from a plain vocab file.
#[derive(Debug, Clone)]
pub struct VocabTable {
    ids:        HashMap<String, u32>,
    default_id: u32,
}

impl VocabTable {
    /// Build a table from tokens in id order.
    /// Fails if the same token appears twice.
    pub fn from_tokens<I, S>(tokens: I, default_id: u32) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ids = HashMap::new();

        for (id, token) in tokens.into_iter().enumerate() {
            let token = token.into();
            if ids.contains_key(&token) {
                bail!("Duplicate vocabulary entry '{}' at line {}", token, id + 1);
            }
            ids.insert(token, id as u32);
        }

        Ok(Self { ids, default_id })
    }

    /// Read a vocab file, one token per line. The whole line is the key.
    pub fn from_file(path: impl AsRef<Path>, default_id: u32) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Cannot read vocab file '{}'", path.display()))?;

        Self::from_tokens(text.lines(), default_id)
            .with_context(|| format!("Invalid vocab file '{}'", path.display()))
    }
}

impl VocabLookup for VocabTable {
    fn lookup(&self, token: &str) -> u32 {
        self.ids.get(token).copied().unwrap_or(self.default_id)
    }

    fn default_id(&self) -> u32 {
        self.default_id
    }

    fn len(&self) -> usize {
        self.ids.len()
    }
}

// ─── TokenizerVocab ───────────────────────────────────────────────────────────
/// A HuggingFace tokenizer used purely as a token -> id table.
/// Sentences are still split on whitespace by the pipeline; the
/// tokenizer's own pre-tokenizer and model are not run.
pub struct TokenizerVocab {
    tokenizer:  Tokenizer,
    default_id: u32,
}

impl TokenizerVocab {
    pub fn new(tokenizer: Tokenizer, default_id: u32) -> Self {
        Self { tokenizer, default_id }
    }

    pub fn from_file(path: impl AsRef<Path>, default_id: u32) -> Result<Self> {
        let path = path.as_ref();
        let tokenizer = Tokenizer::from_file(path)
            .map_err(|e| anyhow::anyhow!(
                "Cannot load tokenizer from '{}': {}", path.display(), e
            ))?;
        Ok(Self::new(tokenizer, default_id))
    }
}

impl VocabLookup for TokenizerVocab {
    fn lookup(&self, token: &str) -> u32 {
        self.tokenizer.token_to_id(token).unwrap_or(self.default_id)
    }

    fn default_id(&self) -> u32 {
        self.default_id
    }

    fn len(&self) -> usize {
        self.tokenizer.get_vocab_size(true)
    }
}
