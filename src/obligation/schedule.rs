use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::cadence::{Cadence, PeriodKey};
use super::definition::ObligationDefinition;

pub const DEFAULT_MAX_PERIODS: usize = 12_000;

/// Relationship between successive due dates and the schedule's first date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum DayAnchoring {
    /// Each date is one step after the previous one; a clamped day carries forward.
    #[default]
    Rolling,
    /// Each date is `k` periods after the first one, restoring its day-of-month
    /// whenever the target month allows it.
    StartDay,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScheduleOptions {
    pub anchoring: DayAnchoring,
    pub max_periods: usize,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            anchoring: DayAnchoring::Rolling,
            max_periods: DEFAULT_MAX_PERIODS,
        }
    }
}

/// One projected due date of an obligation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleInstance {
    pub index: u32,
    pub due_date: NaiveDate,
    pub period_key: PeriodKey,
    pub expected_amount: Decimal,
}

/// Projects every due date strictly before `as_of` using default options.
pub fn project(obligation: &ObligationDefinition, as_of: NaiveDate) -> Vec<ScheduleInstance> {
    project_with(obligation, as_of, &ScheduleOptions::default())
}

pub fn project_with(
    obligation: &ObligationDefinition,
    as_of: NaiveDate,
    options: &ScheduleOptions,
) -> Vec<ScheduleInstance> {
    let mut instances = Vec::new();
    let dates = DueDates::new(obligation.start_date, obligation.cadence, options.anchoring);

    for (index, due_date) in dates.take_while(|date| *date < as_of).enumerate() {
        if index >= options.max_periods {
            warn!(
                obligation = %obligation.id,
                max_periods = options.max_periods,
                "schedule projection truncated"
            );
            break;
        }
        instances.push(ScheduleInstance {
            index: index as u32,
            due_date,
            period_key: obligation.cadence.period_key(due_date),
            expected_amount: obligation.periodic_amount,
        });
    }

    instances
}

/// Successive due dates of a schedule, beginning with the anchor itself.
///
/// Ends when the calendar runs out, so every consumer terminates even without a
/// date bound.
pub(crate) struct DueDates {
    anchor: NaiveDate,
    cadence: Cadence,
    anchoring: DayAnchoring,
    current: Option<NaiveDate>,
    steps: u32,
}

impl DueDates {
    pub(crate) fn new(anchor: NaiveDate, cadence: Cadence, anchoring: DayAnchoring) -> Self {
        Self {
            anchor,
            cadence,
            anchoring,
            current: Some(anchor),
            steps: 0,
        }
    }
}

impl Iterator for DueDates {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.current?;
        self.current = match self.steps.checked_add(1) {
            Some(steps) => {
                self.steps = steps;
                match self.anchoring {
                    DayAnchoring::Rolling => self.cadence.try_step(current),
                    DayAnchoring::StartDay => self.cadence.advance(self.anchor, steps),
                }
            }
            None => None,
        };
        Some(current)
    }
}
