//! Property-based tests for ns-math.
//!
//! Uses proptest to verify the structural invariants of the tail
//! distribution, the confidence queries, the PNN outputs and the window
//! averager across many random inputs.

use ns_math::{aut_filt, pnn, tailprob, IdentityEvaluator};
use proptest::prelude::*;

/// Tolerance for sums and interpolation round-off.
const TOL: f64 = 1e-9;

/// Samples drawn from a narrow integer range so repeats are common.
fn repeated_sample() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-20i32..20, 1..200)
        .prop_map(|v| v.into_iter().map(f64::from).collect())
}

/// Samples with mostly distinct values.
fn spread_sample() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1.0e3..1.0e3f64, 2..200)
}

// ============================================================================
// tailprob construction
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Values come out strictly increasing and never longer than the sample.
    #[test]
    fn values_strictly_increasing(sample in repeated_sample()) {
        let n = sample.len();
        let dist = tailprob(sample, 0.05).unwrap();
        prop_assert!(dist.len() <= n);
        prop_assert_eq!(dist.sample_size(), n);
        prop_assert!(dist.values().windows(2).all(|w| w[0] < w[1]));
    }

    /// Every distinct value of the sample survives, and nothing else.
    #[test]
    fn values_are_the_distinct_sample(sample in repeated_sample()) {
        let mut expected = sample.clone();
        expected.sort_by(f64::total_cmp);
        expected.dedup();
        let dist = tailprob(sample, 0.05).unwrap();
        prop_assert_eq!(dist.values(), expected.as_slice());
    }

    /// Probabilities lie in [0, 1] with exact endpoints.
    #[test]
    fn probability_bounds(sample in repeated_sample()) {
        let dist = tailprob(sample, 0.05).unwrap();
        let left = dist.left_probs();
        let right = dist.right_probs();
        prop_assert!(left.iter().chain(right).all(|&p| (0.0..=1.0).contains(&p)));
        prop_assert_eq!(left[left.len() - 1], 1.0);
        prop_assert_eq!(right[0], 1.0);
    }

    /// lprob non-decreasing, rprob non-increasing.
    #[test]
    fn probabilities_monotone(sample in repeated_sample()) {
        let dist = tailprob(sample, 0.05).unwrap();
        prop_assert!(dist.left_probs().windows(2).all(|w| w[0] <= w[1]));
        prop_assert!(dist.right_probs().windows(2).all(|w| w[0] >= w[1]));
    }

    /// Left tail at i and right tail at i+1 partition the sample.
    #[test]
    fn adjacent_tails_sum_to_one(sample in repeated_sample()) {
        let dist = tailprob(sample, 0.05).unwrap();
        for i in 0..dist.len() - 1 {
            let total = dist.left_probs()[i] + dist.right_probs()[i + 1];
            prop_assert!((total - 1.0).abs() < TOL, "i={} total={}", i, total);
        }
    }

    /// Counts recovered from lprob match the raw multiplicities.
    #[test]
    fn left_probs_count_repeats(sample in repeated_sample()) {
        let n = sample.len();
        let raw = sample.clone();
        let dist = tailprob(sample, 0.05).unwrap();
        for (i, &value) in dist.values().iter().enumerate() {
            let at_most = raw.iter().filter(|&&x| x <= value).count();
            let at_least = raw.iter().filter(|&&x| x >= value).count();
            prop_assert!((dist.left_probs()[i] * n as f64 - at_most as f64).abs() < TOL);
            prop_assert!((dist.right_probs()[i] * n as f64 - at_least as f64).abs() < TOL);
        }
    }

    /// ks_error depends only on sample size and alpha.
    #[test]
    fn ks_error_ignores_values(sample in spread_sample(), alpha in 0.001..0.999f64) {
        let n = sample.len();
        let shifted: Vec<f64> = sample.iter().map(|x| x * 3.0 + 7.0).collect();
        let a = tailprob(sample, alpha).unwrap();
        let b = tailprob(shifted, alpha).unwrap();
        prop_assert_eq!(a.ks_error(), b.ks_error());
        let expected = (-0.5 * (0.5 * alpha).ln() / n as f64).sqrt();
        prop_assert!((a.ks_error() - expected).abs() < 1e-15);
        prop_assert!(a.ks_error() > 0.0);
    }
}

// ============================================================================
// Confidence queries
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Boundary points bypass interpolation and agree exactly.
    #[test]
    fn boundary_agreement(sample in repeated_sample()) {
        let dist = tailprob(sample, 0.05).unwrap();
        let last = dist.len() - 1;
        let lo = dist.values()[0];
        let hi = dist.values()[last];
        prop_assert_eq!(dist.left_confidence(lo), 100.0 * (1.0 - dist.left_probs()[0]));
        prop_assert_eq!(dist.right_confidence(hi), 100.0 * (1.0 - dist.right_probs()[last]));
        prop_assert_eq!(dist.left_confidence(hi + 1.0), 0.0);
        prop_assert_eq!(dist.right_confidence(lo - 1.0), 0.0);
    }

    /// Exact hits on interior sample values return that value's tail.
    #[test]
    fn interior_hits_are_exact(sample in repeated_sample()) {
        let dist = tailprob(sample, 0.05).unwrap();
        for (i, &value) in dist.values().iter().enumerate().skip(1) {
            prop_assert_eq!(dist.left_confidence(value), 100.0 * (1.0 - dist.left_probs()[i]));
            prop_assert_eq!(dist.right_confidence(value), 100.0 * (1.0 - dist.right_probs()[i]));
        }
    }

    /// Confidences stay in [0, 100].
    #[test]
    fn confidence_in_range(sample in spread_sample(), observed in -1.5e3..1.5e3f64) {
        let dist = tailprob(sample, 0.05).unwrap();
        let left = dist.left_confidence(observed);
        let right = dist.right_confidence(observed);
        prop_assert!((-TOL..=100.0 + TOL).contains(&left), "left={}", left);
        prop_assert!((-TOL..=100.0 + TOL).contains(&right), "right={}", right);
    }

    /// leftconf never increases, rightconf never decreases, as observed grows.
    #[test]
    fn confidence_monotone(sample in repeated_sample(), steps in 2usize..100) {
        let dist = tailprob(sample, 0.05).unwrap();
        let lo = dist.values()[0];
        let hi = dist.values()[dist.len() - 1];
        let mut grid: Vec<f64> = (0..=steps)
            .map(|k| lo + (hi - lo) * k as f64 / steps as f64)
            .chain(dist.values().iter().copied())
            .collect();
        grid.sort_by(f64::total_cmp);

        for w in grid.windows(2) {
            let (a, b) = (w[0], w[1]);
            prop_assert!(dist.left_confidence(a) + TOL >= dist.left_confidence(b),
                "leftconf({})={} < leftconf({})={}", a, dist.left_confidence(a), b, dist.left_confidence(b));
            prop_assert!(dist.right_confidence(a) <= dist.right_confidence(b) + TOL,
                "rightconf({})={} > rightconf({})={}", a, dist.right_confidence(a), b, dist.right_confidence(b));
        }
    }
}

// ============================================================================
// PNN
// ============================================================================

fn populations() -> impl Strategy<Value = (Vec<f64>, Vec<Vec<Vec<f64>>>)> {
    (1usize..5).prop_flat_map(|nvars| {
        let vector = prop::collection::vec(-10.0..10.0f64, nvars);
        let population = prop::collection::vec(vector.clone(), 1..8);
        (vector, prop::collection::vec(population, 1..5))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Outputs are mean kernel weights, so they lie in [0, 1].
    #[test]
    fn pnn_outputs_bounded((unknown, pops) in populations(), model in 1i32..4, sigma in 0.05..5.0f64) {
        let result = pnn(&unknown, &pops, model, sigma).unwrap();
        prop_assert_eq!(result.outputs.len(), pops.len());
        prop_assert!(result.outputs.iter().all(|&o| (0.0..=1.0).contains(&o)));
    }

    /// The winner holds the first maximum.
    #[test]
    fn pnn_winner_is_first_max((unknown, pops) in populations(), model in 1i32..4, sigma in 0.05..5.0f64) {
        let result = pnn(&unknown, &pops, model, sigma).unwrap();
        let best = result.outputs[result.winner];
        prop_assert!(result.outputs.iter().all(|&o| o <= best));
        prop_assert!(result.outputs[..result.winner].iter().all(|&o| o < best));
    }

    /// Uniform priors never change the ranking.
    #[test]
    fn uniform_priors_keep_winner((unknown, pops) in populations(), weight in 0.01..10.0f64) {
        let result = pnn(&unknown, &pops, 1, 1.0).unwrap();
        let priors = vec![weight; pops.len()];
        let weighted = result.with_priors(&priors).unwrap();
        // Tiny outputs can underflow to equal values once scaled
        if result.outputs.iter().all(|&o| o > 1e-300) {
            prop_assert_eq!(weighted.winner, result.winner);
        }
    }
}

// ============================================================================
// Window averager
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// A constant-one evaluator yields all ones: the divisors equal coverage.
    #[test]
    fn coverage_divisors_exact(len in 1usize..60, width_seed in 0usize..60) {
        let width = 1 + width_seed % len;
        let input = vec![0.0; len];
        let out = aut_filt(width, &input, |_: &[f64], out: &mut [f64]| out.fill(1.0)).unwrap();
        prop_assert!(out.iter().all(|&v| v == 1.0), "width={} len={} out={:?}", width, len, out);
    }

    /// The identity network reproduces the series.
    #[test]
    fn identity_reproduces(input in prop::collection::vec(-100.0..100.0f64, 1..60), width_seed in 0usize..60) {
        let width = 1 + width_seed % input.len();
        let out = aut_filt(width, &input, IdentityEvaluator).unwrap();
        for (o, i) in out.iter().zip(&input) {
            prop_assert!((o - i).abs() < 1e-9, "{} != {}", o, i);
        }
    }
}
