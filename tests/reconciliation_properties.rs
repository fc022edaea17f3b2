use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate};
use obligation_core::obligation::{
    accumulate, next_due, project, project_with, reconcile, reconcile_obligation, Cadence,
    DayAnchoring, ObligationDefinition, ObligationKind, ScheduleOptions, TransactionRecord,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

fn last_day(year: i32, month: u32) -> u32 {
    (28..=31)
        .rev()
        .find(|day| NaiveDate::from_ymd_opt(year, month, *day).is_some())
        .expect("every month has at least 28 days")
}

/// Counts due dates before `as_of` from calendar arithmetic alone, assuming each
/// due date keeps the start day clamped to its own month.
fn expected_periods(start: NaiveDate, as_of: NaiveDate, cadence: Cadence) -> usize {
    if start >= as_of {
        return 0;
    }
    let step = i64::from(cadence.months());
    let diff = month_index(as_of) - month_index(start);
    let mut count = (diff + step - 1) / step;
    if diff % step == 0 {
        let due_day = start.day().min(last_day(as_of.year(), as_of.month()));
        if due_day < as_of.day() {
            count += 1;
        }
    }
    count as usize
}

/// Counts due dates before `as_of` by walking month indices directly. Under
/// rolling anchoring the due day only ever shrinks: it is the smallest of the
/// start day and the lengths of every month visited so far.
fn expected_rolling_periods(start: NaiveDate, as_of: NaiveDate, cadence: Cadence) -> usize {
    let step = i64::from(cadence.months());
    let mut index = month_index(start);
    let mut day = start.day();
    let mut count = 0;
    loop {
        let year = index.div_euclid(12) as i32;
        let month = index.rem_euclid(12) as u32 + 1;
        day = day.min(last_day(year, month));
        let due = NaiveDate::from_ymd_opt(year, month, day).expect("clamped day is valid");
        if due >= as_of {
            return count;
        }
        count += 1;
        index += step;
    }
}

fn cadence_strategy() -> impl Strategy<Value = Cadence> {
    prop_oneof![
        Just(Cadence::Monthly),
        Just(Cadence::Quarterly),
        Just(Cadence::Annually),
    ]
}

fn start_strategy(max_day: u32) -> impl Strategy<Value = NaiveDate> {
    (2000i32..2030, 1u32..=12, 1u32..=max_day).prop_map(|(year, month, day)| {
        NaiveDate::from_ymd_opt(year, month, day.min(last_day(year, month)))
            .expect("clamped day is valid")
    })
}

fn build(start: NaiveDate, cadence: Cadence, cents: i64) -> ObligationDefinition {
    ObligationDefinition::new(
        Uuid::new_v4(),
        ObligationKind::HealthPremium,
        start,
        cadence,
        Decimal::new(cents, 2),
    )
}

fn payments(
    obligation: &ObligationDefinition,
    raw: &[(i64, i64)],
) -> Vec<TransactionRecord> {
    raw.iter()
        .map(|(offset, cents)| {
            TransactionRecord::new(
                obligation.id,
                Decimal::new(*cents, 2),
                obligation.start_date + Duration::days(*offset),
            )
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    })]

    #[test]
    fn projected_dates_strictly_increase(
        start in start_strategy(31),
        cadence in cadence_strategy(),
        span in 0i64..6000,
    ) {
        let obligation = build(start, cadence, 10_000);
        let instances = project(&obligation, start + Duration::days(span));
        for pair in instances.windows(2) {
            prop_assert!(pair[0].due_date < pair[1].due_date);
        }
    }

    #[test]
    fn projection_length_matches_calendar_count(
        start in start_strategy(28),
        cadence in cadence_strategy(),
        span in -60i64..6000,
    ) {
        let obligation = build(start, cadence, 10_000);
        let as_of = start + Duration::days(span);
        prop_assert_eq!(
            project(&obligation, as_of).len(),
            expected_periods(start, as_of, cadence)
        );
    }

    #[test]
    fn rolling_projection_follows_clamp_drift(
        start in start_strategy(31),
        cadence in cadence_strategy(),
        span in -60i64..6000,
    ) {
        let obligation = build(start, cadence, 10_000);
        let as_of = start + Duration::days(span);
        let instances = project(&obligation, as_of);
        prop_assert_eq!(
            instances.len(),
            expected_rolling_periods(start, as_of, cadence)
        );
        for pair in instances.windows(2) {
            prop_assert!(pair[1].due_date.day() <= pair[0].due_date.day());
        }
    }

    #[test]
    fn start_day_projection_length_matches_calendar_count(
        start in start_strategy(31),
        cadence in cadence_strategy(),
        span in -60i64..6000,
    ) {
        let obligation = build(start, cadence, 10_000);
        let as_of = start + Duration::days(span);
        let options = ScheduleOptions {
            anchoring: DayAnchoring::StartDay,
            ..ScheduleOptions::default()
        };
        prop_assert_eq!(
            project_with(&obligation, as_of, &options).len(),
            expected_periods(start, as_of, cadence)
        );
    }

    #[test]
    fn matcher_partitions_every_instance(
        start in start_strategy(31),
        cadence in cadence_strategy(),
        span in 0i64..4000,
        raw in prop::collection::vec((-60i64..4000, 0i64..50_000), 0..20),
    ) {
        let obligation = build(start, cadence, 2_500);
        let instances = project(&obligation, start + Duration::days(span));
        let txns = payments(&obligation, &raw);
        let matched = reconcile(&instances, &txns);

        prop_assert_eq!(matched.satisfied.len() + matched.missing.len(), instances.len());
        let satisfied: HashSet<u32> = matched.satisfied.iter().map(|inst| inst.index).collect();
        let missing: HashSet<u32> = matched.missing.iter().map(|inst| inst.index).collect();
        prop_assert!(satisfied.is_disjoint(&missing));
        for inst in &matched.satisfied {
            prop_assert!(txns.iter().any(|txn| inst.period_key.contains(txn.occurred_on)));
        }
        for inst in &matched.missing {
            prop_assert!(!txns.iter().any(|txn| inst.period_key.contains(txn.occurred_on)));
        }
    }

    #[test]
    fn ledger_identity_holds(
        start in start_strategy(31),
        cadence in cadence_strategy(),
        span in -30i64..4000,
        amount in 0i64..100_000,
        raw in prop::collection::vec((-60i64..4000, 0i64..200_000), 0..20),
    ) {
        let obligation = build(start, cadence, amount);
        let as_of = start + Duration::days(span);
        let instances = project(&obligation, as_of);
        let txns = payments(&obligation, &raw);
        let totals = accumulate(&instances, &txns);

        prop_assert_eq!(totals.total_due - totals.total_paid, totals.outstanding_balance);
        prop_assert_eq!(
            totals.total_due,
            obligation.periodic_amount * Decimal::from(instances.len() as u64)
        );
        if instances.is_empty() && txns.is_empty() {
            prop_assert!(totals.outstanding_balance.is_zero());
        }
    }

    #[test]
    fn reconciliation_is_idempotent(
        start in start_strategy(31),
        cadence in cadence_strategy(),
        span in 0i64..4000,
        raw in prop::collection::vec((-60i64..4000, 0i64..50_000), 0..10),
    ) {
        let obligation = build(start, cadence, 4_200);
        let as_of = start + Duration::days(span);
        let txns = payments(&obligation, &raw);
        let first = reconcile_obligation(&obligation, &txns, as_of).unwrap();
        let second = reconcile_obligation(&obligation, &txns, as_of).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn next_due_is_always_after_as_of(
        start in start_strategy(31),
        cadence in cadence_strategy(),
        span in -400i64..4000,
        raw in prop::collection::vec((-60i64..4000, 0i64..50_000), 0..5),
    ) {
        let obligation = build(start, cadence, 1_000);
        let as_of = start + Duration::days(span);
        let txns = payments(&obligation, &raw);
        let next = next_due(&obligation, &txns, as_of).expect("calendar not exhausted");
        prop_assert!(next > as_of);
    }
}
