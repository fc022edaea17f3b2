use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::cadence::PeriodKey;
use super::definition::TransactionRecord;
use super::schedule::ScheduleInstance;

/// Partition of projected instances into paid and unpaid periods.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Matched {
    pub satisfied: Vec<ScheduleInstance>,
    pub missing: Vec<ScheduleInstance>,
}

impl Matched {
    pub fn len(&self) -> usize {
        self.satisfied.len() + self.missing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Marks an instance satisfied when any transaction falls in its period key.
///
/// Matching is by period existence, so several payments in one period satisfy it
/// once and no payment is consumed.
pub fn reconcile(instances: &[ScheduleInstance], transactions: &[TransactionRecord]) -> Matched {
    let months: HashSet<PeriodKey> = transactions
        .iter()
        .map(|txn| PeriodKey::month_of(txn.occurred_on))
        .collect();
    let years: HashSet<PeriodKey> = transactions
        .iter()
        .map(|txn| PeriodKey::year_of(txn.occurred_on))
        .collect();

    let mut matched = Matched::default();
    for instance in instances {
        let paid = match instance.period_key {
            PeriodKey::Month { .. } => months.contains(&instance.period_key),
            PeriodKey::Year(_) => years.contains(&instance.period_key),
        };
        if paid {
            matched.satisfied.push(instance.clone());
        } else {
            matched.missing.push(instance.clone());
        }
    }
    matched
}
