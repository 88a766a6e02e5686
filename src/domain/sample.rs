// ============================================================
// Layer 3 - Encoded Samples
// ============================================================
// One element of a pipeline after tokenisation and vocabulary
// lookup, before batching.
//
// For translation pairs the decoder needs two views of the
// target sentence, shifted by one position:
//
//   target          =        [ a  b  c ]
//   target_input    = [ <s>    a  b  c ]
//   target_output   = [        a  b  c  </s> ]
//
// The decoder reads target_input and is trained to emit
// target_output, one step ahead.

/// A source sentence for inference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSample {
    pub source: Vec<u32>,
}

impl SourceSample {
    pub fn new(source: Vec<u32>) -> Self {
        Self { source }
    }

    pub fn source_len(&self) -> usize {
        self.source.len()
    }
}

/// A source/target pair with the decoder input and output views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeqPairSample {
    pub source:        Vec<u32>,
    pub target_input:  Vec<u32>,
    pub target_output: Vec<u32>,
}

impl SeqPairSample {
    /// Build the pair, deriving both target views from `target`.
    pub fn new(source: Vec<u32>, target: &[u32], sos_id: u32, eos_id: u32) -> Self {
        let mut target_input = Vec::with_capacity(target.len() + 1);
        target_input.push(sos_id);
        target_input.extend_from_slice(target);

        let mut target_output = Vec::with_capacity(target.len() + 1);
        target_output.extend_from_slice(target);
        target_output.push(eos_id);

        Self { source, target_input, target_output }
    }

    pub fn source_len(&self) -> usize {
        self.source.len()
    }

    /// Length of the decoder sequence, counting the leading <s>
    pub fn target_len(&self) -> usize {
        self.target_input.len()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_views_are_shifted() {
        let s = SeqPairSample::new(vec![5, 6], &[10, 11, 12], 1, 2);
        assert_eq!(s.target_input,  vec![1, 10, 11, 12]);
        assert_eq!(s.target_output, vec![10, 11, 12, 2]);
    }

    #[test]
    fn test_lengths() {
        let s = SeqPairSample::new(vec![5, 6], &[10, 11, 12], 1, 2);
        assert_eq!(s.source_len(), 2);
        // target length includes the start marker
        assert_eq!(s.target_len(), 4);
        assert_eq!(s.target_output.len(), s.target_len());
    }

    #[test]
    fn test_source_sample_len() {
        assert_eq!(SourceSample::new(vec![]).source_len(), 0);
        assert_eq!(SourceSample::new(vec![3, 4, 5]).source_len(), 3);
    }
}
