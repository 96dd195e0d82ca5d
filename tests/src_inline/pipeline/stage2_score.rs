use super::*;
use crate::pipeline::stage1_pairs::{Comparison, Role};

fn shuffled(n: usize, seed: u64) -> Vec<f64> {
    let mut values = (0..n).map(|i| i as f64).collect::<Vec<_>>();
    let mut state = seed;
    for i in (1..n).rev() {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let j = (state % (i as u64 + 1)) as usize;
        values.swap(i, j);
    }
    values
}

fn assert_bounds(r: &ScoreResult) {
    assert!(0.0 <= r.lower, "{r:?}");
    assert!(r.lower <= r.accuracy, "{r:?}");
    assert!(r.accuracy <= r.upper, "{r:?}");
    assert!(r.upper <= 100.0, "{r:?}");
}

#[test]
fn test_binary_classes_separated_score_100() {
    let truth = [1.0, 0.0, 1.0, 0.0, 1.0];
    let prediction = [0.9, 0.2, 0.8, 0.4, 0.7];
    let r = score(&truth, &prediction).unwrap();
    assert_eq!(r.accuracy, 100.0);
    assert_eq!(r.tau, 1.0);
    assert_eq!(r.n, 5);
    assert_eq!(r.concordant, 6);
    assert_eq!(r.discordant, 0);
    assert_eq!(r.upper, 100.0);
    assert_bounds(&r);
}

#[test]
fn test_perfect_agreement_and_disagreement() {
    let truth = (0..20).map(|i| i as f64 * 0.5).collect::<Vec<_>>();
    let same = score(&truth, &truth).unwrap();
    assert_eq!(same.accuracy, 100.0);

    let cubed = truth.iter().map(|v| v * v * v + 3.0).collect::<Vec<_>>();
    assert_eq!(score(&truth, &cubed).unwrap().accuracy, 100.0);

    let negated = truth.iter().map(|v| -v).collect::<Vec<_>>();
    let opposite = score(&truth, &negated).unwrap();
    assert_eq!(opposite.accuracy, 0.0);
    assert_eq!(opposite.lower, 0.0);
    assert_bounds(&opposite);
}

#[test]
fn test_interval_half_width_follows_standard_error() {
    let truth = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
    let prediction = [2.0, 1.0, 3.0, 5.0, 4.0, 6.0, 8.0, 7.0];
    let r = score(&truth, &prediction).unwrap();
    let half = Z_95 * 50.0 * tau_standard_error(8);
    assert!((r.accuracy - (r.lower + half)).abs() < 1e-12 || r.lower == 0.0);
    assert!((r.upper - r.accuracy - half).abs() < 1e-12 || r.upper == 100.0);

    let expected_se = ((2.0 * (2.0 * 8.0 + 5.0)) / (9.0 * 8.0 * 7.0) as f64).sqrt();
    assert!((tau_standard_error(8) - expected_se).abs() < 1e-15);
    // 3 adjacent swaps out of 28 pairs
    assert_eq!(r.discordant, 3);
    assert!((r.tau - 22.0 / 28.0).abs() < 1e-12);
}

#[test]
fn test_symmetry() {
    let a = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0, 5.0, 3.0];
    let b = [2.7, 1.8, 2.8, 1.8, 2.8, 4.5, 9.0, 0.4, 5.2, 3.5];
    let ab = score(&a, &b).unwrap();
    let ba = score(&b, &a).unwrap();
    assert_eq!(ab.accuracy.to_bits(), ba.accuracy.to_bits());
    assert_eq!(ab.lower.to_bits(), ba.lower.to_bits());
    assert_eq!(ab.upper.to_bits(), ba.upper.to_bits());
}

#[test]
fn test_bounds_hold_on_mixed_inputs() {
    for seed in 1..20u64 {
        let truth = shuffled(30, seed);
        let prediction = shuffled(30, seed * 7 + 3)
            .into_iter()
            .map(|v| (v / 4.0).floor())
            .collect::<Vec<_>>();
        let r = score(&truth, &prediction).unwrap();
        assert_bounds(&r);
    }
}

#[test]
fn test_random_permutations_trend_to_chance() {
    let n = 5_000;
    let truth = (0..n).map(|i| i as f64).collect::<Vec<_>>();
    let prediction = shuffled(n, 0xDEAD_BEEF);
    let r = score(&truth, &prediction).unwrap();
    assert!((r.accuracy - 50.0).abs() < 3.0, "{r:?}");

    let small = score(&truth[..20], &prediction[..20]).unwrap();
    assert!(small.upper - small.lower > r.upper - r.lower);
}

#[test]
fn test_degenerate_truth_rejected() {
    let err = score(&[1.0, 1.0, 1.0], &[2.0, 3.0, 4.0]).unwrap_err();
    assert_eq!(err, InvalidInputError::Degenerate { side: Side::Truth });

    let err = score(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]).unwrap_err();
    assert_eq!(
        err,
        InvalidInputError::Degenerate {
            side: Side::Prediction
        }
    );
}

#[test]
fn test_shape_errors() {
    let err = score(&[1.0, 2.0, 3.0, 4.0, 5.0], &[1.0, 2.0, 3.0, 4.0]).unwrap_err();
    assert_eq!(
        err,
        InvalidInputError::LengthMismatch {
            truth: 5,
            prediction: 4
        }
    );
    assert_eq!(
        score(&[1.0], &[1.0]).unwrap_err(),
        InvalidInputError::TooFewObservations { n: 1 }
    );
    assert_eq!(
        score(&[], &[]).unwrap_err(),
        InvalidInputError::TooFewObservations { n: 0 }
    );
}

#[test]
fn test_non_finite_rejected() {
    let err = score(&[1.0, f64::NAN, 3.0], &[1.0, 2.0, 3.0]).unwrap_err();
    assert_eq!(
        err,
        InvalidInputError::NonFinite {
            side: Side::Truth,
            index: 1
        }
    );
    let err = score(&[1.0, 2.0, 3.0], &[1.0, 2.0, f64::INFINITY]).unwrap_err();
    assert!(matches!(
        err,
        InvalidInputError::NonFinite {
            side: Side::Prediction,
            index: 2
        }
    ));
}

#[test]
fn test_heavy_ties_use_only_untied_pairs() {
    // only (1,2) and (1,3) differ in both sequences, both discordant
    let r = score(&[0.0, 0.0, 1.0, 1.0], &[0.0, 1.0, 0.0, 0.0]).unwrap();
    assert_eq!(r.concordant, 0);
    assert_eq!(r.discordant, 2);
    assert_eq!(r.accuracy, 0.0);
    assert_bounds(&r);
}

#[test]
fn test_error_message_is_descriptive() {
    let err = score(&[1.0, 1.0], &[1.0, 2.0]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "truth has a single distinct value; concordance is undefined"
    );
}

fn comparison(name: &str, truth: Vec<f64>, prediction: Vec<f64>) -> Comparison {
    Comparison {
        group: None,
        predictor: name.to_string(),
        role: Role::Model,
        truth,
        prediction,
        n_dropped: 0,
    }
}

#[test]
fn test_run_comparisons_skip_keeps_errors() {
    let comparisons = vec![
        comparison("good", vec![1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0]),
        comparison("flat", vec![1.0, 2.0, 3.0], vec![0.0, 0.0, 0.0]),
    ];
    let outcomes = run_comparisons(&comparisons, ErrorPolicy::Skip).unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].result.as_ref().unwrap().accuracy, 100.0);
    assert!(matches!(
        outcomes[1].result,
        Err(InvalidInputError::Degenerate { .. })
    ));
    assert_eq!(outcomes[1].n, 3);
    assert_eq!(outcomes[1].n_dropped, 0);
}

#[test]
fn test_run_comparisons_abort_stops() {
    let comparisons = vec![
        comparison("flat", vec![1.0, 2.0, 3.0], vec![0.0, 0.0, 0.0]),
        comparison("good", vec![1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0]),
    ];
    let err = run_comparisons(&comparisons, ErrorPolicy::Abort).unwrap_err();
    assert_eq!(err.label, "flat");
    assert!(err.to_string().starts_with("comparison flat failed"));
}
