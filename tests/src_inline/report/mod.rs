use super::*;
use crate::model::score::InvalidInputError;

fn result(accuracy: f64, lower: f64, upper: f64) -> ScoreResult {
    ScoreResult {
        accuracy,
        lower,
        upper,
        n: 10,
        tau: (accuracy - 50.0) / 50.0,
        concordant: 0,
        discordant: 0,
    }
}

fn outcome(
    group: Option<&str>,
    predictor: &str,
    r: Result<ScoreResult, InvalidInputError>,
) -> ComparisonOutcome {
    ComparisonOutcome {
        group: group.map(str::to_string),
        predictor: predictor.to_string(),
        role: Role::Model,
        n: 10,
        n_dropped: 0,
        result: r,
    }
}

#[test]
fn test_compare_intervals() {
    let model = result(80.0, 75.0, 85.0);
    assert_eq!(
        compare_intervals(&model, &result(60.0, 55.0, 65.0)),
        Verdict::Outperforms
    );
    assert_eq!(
        compare_intervals(&model, &result(95.0, 90.0, 100.0)),
        Verdict::Underperforms
    );
    assert_eq!(
        compare_intervals(&model, &result(72.0, 65.0, 79.0)),
        Verdict::Indistinguishable
    );
    // touching bounds overlap
    assert_eq!(
        compare_intervals(&model, &result(70.0, 65.0, 75.0)),
        Verdict::Indistinguishable
    );
}

#[test]
fn test_scale_and_rounding() {
    let r = result(87.654321, 80.0, 95.308642);
    let pct = ScaledScore::from_result(&r, Scale::Percent);
    assert_eq!(pct.accuracy, 87.6543);
    assert_eq!(pct.upper, 95.3086);

    let frac = ScaledScore::from_result(&r, Scale::Fraction);
    assert_eq!(frac.accuracy, 0.8765);
    assert_eq!(frac.lower, 0.8);

    assert_eq!(format_f64_4(0.5), "0.5000");
}

#[test]
fn test_sorted_outcomes_overall_first() {
    let outcomes = vec![
        outcome(Some("loan"), "b", Ok(result(60.0, 50.0, 70.0))),
        outcome(None, "b", Ok(result(60.0, 50.0, 70.0))),
        outcome(Some("card"), "a", Ok(result(60.0, 50.0, 70.0))),
        outcome(None, "a", Ok(result(60.0, 50.0, 70.0))),
    ];
    let order = sorted_outcomes(&outcomes)
        .iter()
        .map(|o| format!("{}:{}", group_label(o.group.as_deref()), o.predictor))
        .collect::<Vec<_>>();
    assert_eq!(order, vec!["all:a", "all:b", "card:a", "loan:b"]);
}

#[test]
fn test_outcome_rows_carry_errors() {
    let outcomes = vec![
        outcome(None, "ok", Ok(result(60.0, 50.0, 70.0))),
        outcome(None, "zz", Err(InvalidInputError::TooFewObservations { n: 1 })),
    ];
    let rows = outcome_rows(&outcomes, Scale::Percent);
    assert_eq!(rows[0].status, "ok");
    assert!(rows[0].score.is_some());
    assert_eq!(rows[1].status, "too few observations: 1 (need at least 2)");
    assert!(rows[1].score.is_none());
    assert_eq!(rows[1].group, OVERALL_GROUP);
}
