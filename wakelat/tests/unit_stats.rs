use wakelat::stats::{cut_index, CostVector};
use wakelat_common::WakeError;

/// Deterministic pseudo-random samples (LCG), so the test needs no RNG crate.
fn scrambled(n: usize, seed: u64) -> Vec<u64> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (state >> 33) % 5_000
        })
        .collect()
}

#[test]
fn test_cut_indices_for_ten_thousand_samples() {
    assert_eq!(cut_index(10_000, 90, 100), 9_000);
    assert_eq!(cut_index(10_000, 99, 100), 9_900);
    assert_eq!(cut_index(10_000, 999, 1_000), 9_990);
    assert_eq!(cut_index(10_000, 9_999, 10_000), 9_999);
}

#[test]
fn test_cut_index_small_buffers_floor() {
    // floor(5 * 0.9) = 4, floor(5 * 0.9999) = 4
    assert_eq!(cut_index(5, 90, 100), 4);
    assert_eq!(cut_index(5, 9_999, 10_000), 4);
    // floor(9 * 0.5) = 4
    assert_eq!(cut_index(9, 1, 2), 4);
    assert_eq!(cut_index(1, 9_999, 10_000), 0);
    assert_eq!(cut_index(0, 90, 100), 0);
    // Clamped: a full fraction never indexes past the end.
    assert_eq!(cut_index(7, 100, 100), 6);
}

#[test]
fn test_cost_vector_for_ten_thousand_samples() {
    // Recorded in descending order so first/last differ from min/max.
    let mut samples: Vec<u64> = (0..10_000).rev().collect();
    let c = CostVector::from_samples(&mut samples).unwrap();

    assert_eq!(c.first_raw, 9_999);
    assert_eq!(c.last_raw, 0);
    assert_eq!(c.min, 0);
    assert_eq!(c.p90, 9_000);
    assert_eq!(c.p99, 9_900);
    assert_eq!(c.p99_9, 9_990);
    assert_eq!(c.p99_99, 9_999);
    assert_eq!(c.max, 9_999);
}

#[test]
fn test_sorts_buffer_in_place_and_is_monotonic() {
    for (n, seed) in [(1, 1), (17, 2), (1_000, 3), (25_000, 4)] {
        let mut samples = scrambled(n, seed);
        let c = CostVector::from_samples(&mut samples).unwrap();

        assert!(samples.windows(2).all(|w| w[0] <= w[1]), "n={n} not sorted");
        assert!(c.min <= c.p90, "n={n}");
        assert!(c.p90 <= c.p99, "n={n}");
        assert!(c.p99 <= c.p99_9, "n={n}");
        assert!(c.p99_9 <= c.p99_99, "n={n}");
        assert!(c.p99_99 <= c.max, "n={n}");
        assert_eq!(c.min, samples[0]);
        assert_eq!(c.max, samples[n - 1]);
    }
}

#[test]
fn test_first_and_last_are_taken_before_sorting() {
    let mut samples = vec![42, 7, 300, 1, 99];
    let c = CostVector::from_samples(&mut samples).unwrap();
    assert_eq!(c.first_raw, 42);
    assert_eq!(c.last_raw, 99);
    assert_eq!(samples, vec![1, 7, 42, 99, 300]);
    // n=5: every upper cut point truncates to index 4.
    assert_eq!(c.p90, 300);
    assert_eq!(c.p99_99, 300);
}

#[test]
fn test_single_sample() {
    let c = CostVector::from_samples(&mut [17]).unwrap();
    assert_eq!(c.labeled().map(|(_, v)| v), [17; 8]);
}

#[test]
fn test_empty_buffer_is_an_error() {
    assert_eq!(CostVector::from_samples(&mut []), Err(WakeError::EmptySamples));
}

#[test]
fn test_labels_in_report_order() {
    let c = CostVector::from_samples(&mut [5, 1, 3]).unwrap();
    let labels: Vec<&str> = c.labeled().iter().map(|(l, _)| *l).collect();
    assert_eq!(labels, ["first", "last", "best", "90%", "99%", "99.9%", "99.99%", "worst"]);
}
