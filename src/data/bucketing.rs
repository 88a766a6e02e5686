// ============================================================
// Layer 4 - Length Bucketing
// ============================================================
// What is a bucket?
//   A group of sentence pairs with similar lengths. Pairs are
//   only batched with their bucket-mates.
//
// Why bucket at all?
//   Padding a batch costs (rows x longest sentence). Mixing a
//   3-word and a 50-word sentence in one batch wastes 47 slots
//   of compute on padding.
//
// Bucket width:
//   src_max_len set  -> ceil(src_max_len / num_buckets)
//   otherwise        -> 10
//
// Bucket id of a pair:
//   min(num_buckets, max(src_len / width, tgt_len / width))
//
// so with width 10, lengths [0, 10) go to bucket 0, [10, 20) to
// bucket 1, and everything past the last boundary shares the
// overflow bucket `num_buckets`.
//
// GroupByWindow then collects elements per key and emits a
// window as soon as it reaches `window_size`; whatever is left
// at the end of the stream is flushed bucket by bucket in
// ascending key order.

use std::collections::BTreeMap;

use crate::domain::hparams::HParams;

const DEFAULT_BUCKET_WIDTH: usize = 10;

// ─── BucketPolicy ─────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketPolicy {
    pub num_buckets:  usize,
    pub bucket_width: usize,
}

impl BucketPolicy {
    pub fn new(num_buckets: usize, src_max_len: Option<usize>) -> Self {
        let num_buckets = num_buckets.max(1);
        let bucket_width = match src_max_len.filter(|&n| n > 0) {
            Some(max_len) => ((max_len + num_buckets - 1) / num_buckets).max(1),
            None          => DEFAULT_BUCKET_WIDTH,
        };
        Self { num_buckets, bucket_width }
    }

    /// The bucket policy for `hparams`, or None when bucketing is off
    pub fn from_hparams(hparams: &HParams) -> Option<Self> {
        (hparams.num_buckets > 1).then(|| Self::new(hparams.num_buckets, hparams.src_max_len()))
    }

    pub fn bucket_id(&self, src_len: usize, tgt_len: usize) -> u64 {
        let id = (src_len / self.bucket_width).max(tgt_len / self.bucket_width);
        id.min(self.num_buckets) as u64
    }
}

// ─── GroupByWindow ────────────────────────────────────────────────────────────
pub struct GroupByWindow<I, K>
where
    I: Iterator,
{
    inner:       I,
    key_fn:      K,
    window_size: usize,
    groups:      BTreeMap<u64, Vec<I::Item>>,
    draining:    bool,
}

impl<I, K> GroupByWindow<I, K>
where
    I: Iterator,
    K: Fn(&I::Item) -> u64,
{
    pub fn new(inner: I, key_fn: K, window_size: usize) -> Self {
        Self {
            inner,
            key_fn,
            window_size: window_size.max(1),
            groups: BTreeMap::new(),
            draining: false,
        }
    }
}

impl<I, K> Iterator for GroupByWindow<I, K>
where
    I: Iterator,
    K: Fn(&I::Item) -> u64,
{
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Vec<I::Item>> {
        if !self.draining {
            while let Some(item) = self.inner.next() {
                let key   = (self.key_fn)(&item);
                let group = self.groups.entry(key).or_default();
                group.push(item);

                if group.len() >= self.window_size {
                    return self.groups.remove(&key);
                }
            }
            self.draining = true;
        }

        self.groups.pop_first().map(|(key, group)| {
            tracing::trace!("Flushing partial window for key {} ({} items)", key, group.len());
            group
        })
    }
}

/// Sequential windows of `size` elements, the last one possibly short.
pub fn sequential_windows<I>(inner: I, size: usize) -> GroupByWindow<I, impl Fn(&I::Item) -> u64>
where
    I: Iterator,
{
    GroupByWindow::new(inner, |_| 0, size)
}
