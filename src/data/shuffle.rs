// ============================================================
// Layer 4 - Buffered Shuffle
// ============================================================
// Shuffles a stream without holding all of it in memory.
//
// Why not shuffle the whole dataset?
//   A full shuffle needs every pair in memory at once. A
//   fixed-size buffer gives a local shuffle at a bounded cost.
//
// A buffer of `capacity` elements is kept full; each output is
// drawn uniformly from the buffer and its slot is refilled from
// the input. With capacity >= stream length this is a uniform
// permutation; smaller buffers only mix elements that are
// within roughly `capacity` positions of each other.
//
// The RNG is a seeded StdRng, so the same seed over the same
// input always gives the same order. Re-initialising a pipeline
// rebuilds the buffer with the same seed.

use rand::{rngs::StdRng, Rng, SeedableRng};

pub struct ShuffleBuffer<I: Iterator> {
    inner:    I,
    buffer:   Vec<I::Item>,
    capacity: usize,
    rng:      StdRng,
}

impl<I: Iterator> ShuffleBuffer<I> {
    /// `seed = None` draws the seed from OS entropy.
    pub fn new(inner: I, capacity: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None       => StdRng::from_entropy(),
        };
        let capacity = capacity.max(1);

        Self {
            inner,
            buffer: Vec::with_capacity(capacity.min(1 << 16)),
            capacity,
            rng,
        }
    }
}

impl<I: Iterator> Iterator for ShuffleBuffer<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        while self.buffer.len() < self.capacity {
            match self.inner.next() {
                Some(item) => self.buffer.push(item),
                None       => break,
            }
        }

        if self.buffer.is_empty() {
            return None;
        }

        let pick = self.rng.gen_range(0..self.buffer.len());
        Some(self.buffer.swap_remove(pick))
    }
}
