use serde::Serialize;
use wakelat_common::{Result, WakeError};

/// Percentile summary of one sample buffer, in microseconds.
///
/// `first_raw` and `last_raw` are the buffer's first and last elements in
/// recording order. They are diagnostics, not statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CostVector {
    pub first_raw: u64,
    pub last_raw: u64,
    pub min: u64,
    pub p90: u64,
    pub p99: u64,
    pub p99_9: u64,
    pub p99_99: u64,
    pub max: u64,
}

impl CostVector {
    /// Sort `samples` ascending in place and extract the fixed cut points.
    ///
    /// Each percentile is read at index `floor(n * parts / whole)`, computed in
    /// integer arithmetic. Buffers smaller than a cut point's resolution
    /// (e.g. fewer than 10000 samples for p99.99) truncate toward lower
    /// indices, and a single-sample buffer reports that sample everywhere.
    pub fn from_samples(samples: &mut [u64]) -> Result<Self> {
        let (Some(&first_raw), Some(&last_raw)) = (samples.first(), samples.last()) else {
            return Err(WakeError::EmptySamples);
        };

        samples.sort_unstable();
        let n = samples.len();

        Ok(CostVector {
            first_raw,
            last_raw,
            min: samples[0],
            p90: samples[cut_index(n, 90, 100)],
            p99: samples[cut_index(n, 99, 100)],
            p99_9: samples[cut_index(n, 999, 1_000)],
            p99_99: samples[cut_index(n, 9_999, 10_000)],
            max: samples[n - 1],
        })
    }

    /// `(label, value)` pairs in report order.
    pub fn labeled(&self) -> [(&'static str, u64); 8] {
        [
            ("first", self.first_raw),
            ("last", self.last_raw),
            ("best", self.min),
            ("90%", self.p90),
            ("99%", self.p99),
            ("99.9%", self.p99_9),
            ("99.99%", self.p99_99),
            ("worst", self.max),
        ]
    }
}

/// Zero-based index of the `parts / whole` cut point in a sorted buffer of
/// `n` elements: `floor(n * parts / whole)`, clamped to the last element.
pub fn cut_index(n: usize, parts: usize, whole: usize) -> usize {
    if n == 0 {
        return 0;
    }
    let idx = (n as u128 * parts as u128 / whole as u128) as usize;
    idx.min(n - 1)
}
