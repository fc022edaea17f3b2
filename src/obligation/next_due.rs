use chrono::NaiveDate;

use super::definition::{ObligationDefinition, TransactionRecord};
use super::schedule::{DueDates, ScheduleOptions};

/// Returns the first due date strictly after `as_of`, stepping from the latest
/// payment of this obligation (or its start date when nothing was paid).
pub fn next_due(
    obligation: &ObligationDefinition,
    transactions: &[TransactionRecord],
    as_of: NaiveDate,
) -> Option<NaiveDate> {
    next_due_with(obligation, transactions, as_of, &ScheduleOptions::default())
}

pub fn next_due_with(
    obligation: &ObligationDefinition,
    transactions: &[TransactionRecord],
    as_of: NaiveDate,
    options: &ScheduleOptions,
) -> Option<NaiveDate> {
    let anchor = latest_payment(obligation, transactions).unwrap_or(obligation.start_date);
    // The anchor itself never counts, even when it already lies after `as_of`.
    DueDates::new(anchor, obligation.cadence, options.anchoring)
        .skip(1)
        .find(|date| *date > as_of)
}

fn latest_payment(
    obligation: &ObligationDefinition,
    transactions: &[TransactionRecord],
) -> Option<NaiveDate> {
    transactions
        .iter()
        .filter(|txn| txn.obligation_id == obligation.id)
        .map(|txn| txn.occurred_on)
        .max()
}
