//! Single-obligation entry point used by reporting callers.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::definition::{ObligationDefinition, TransactionRecord};
use super::ledger::{accrue_interest, accumulate, InterestAccrual};
use super::matcher::reconcile;
use super::next_due::next_due_with;
use super::schedule::{project_with, ScheduleInstance, ScheduleOptions};
use crate::errors::EngineResult;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReconciliationResult {
    pub obligation_id: Uuid,
    pub party_id: Uuid,
    pub as_of: NaiveDate,
    pub satisfied: Vec<ScheduleInstance>,
    pub missing: Vec<ScheduleInstance>,
    pub total_due: Decimal,
    pub total_paid: Decimal,
    pub outstanding_balance: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest: Option<InterestAccrual>,
    pub next_due: Option<NaiveDate>,
}

impl ReconciliationResult {
    /// True when every elapsed period has at least one payment.
    pub fn is_current(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn missing_count(&self) -> usize {
        self.missing.len()
    }

    pub fn period_count(&self) -> usize {
        self.satisfied.len() + self.missing.len()
    }
}

pub fn reconcile_obligation(
    obligation: &ObligationDefinition,
    transactions: &[TransactionRecord],
    as_of: NaiveDate,
) -> EngineResult<ReconciliationResult> {
    reconcile_obligation_with(obligation, transactions, as_of, &ScheduleOptions::default())
}

/// Validates the inputs, then projects, matches, and accumulates one obligation.
///
/// Records that belong to another obligation are dropped before matching.
pub fn reconcile_obligation_with(
    obligation: &ObligationDefinition,
    transactions: &[TransactionRecord],
    as_of: NaiveDate,
    options: &ScheduleOptions,
) -> EngineResult<ReconciliationResult> {
    obligation.validate()?;
    let mut own = Vec::with_capacity(transactions.len());
    for txn in transactions {
        txn.validate()?;
        if txn.obligation_id == obligation.id {
            own.push(txn.clone());
        } else {
            debug!(
                obligation = %obligation.id,
                transaction = %txn.id,
                "skipping transaction of another obligation"
            );
        }
    }

    let instances = project_with(obligation, as_of, options);
    let matched = reconcile(&instances, &own);
    let totals = accumulate(&instances, &own);
    let interest = obligation
        .interest
        .as_ref()
        .map(|terms| accrue_interest(terms, &instances, &own));
    let next_due = next_due_with(obligation, &own, as_of, options);

    debug!(
        obligation = %obligation.id,
        periods = instances.len(),
        missing = matched.missing.len(),
        outstanding = %totals.outstanding_balance,
        "reconciled obligation"
    );

    Ok(ReconciliationResult {
        obligation_id: obligation.id,
        party_id: obligation.party_id,
        as_of,
        satisfied: matched.satisfied,
        missing: matched.missing,
        total_due: totals.total_due,
        total_paid: totals.total_paid,
        outstanding_balance: totals.outstanding_balance,
        interest,
        next_due,
    })
}
