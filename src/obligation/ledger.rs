use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::definition::{InterestTerms, InterestType, TransactionRecord};
use super::schedule::ScheduleInstance;

/// Decimal places kept for each period's interest charge.
pub const INTEREST_SCALE: u32 = 2;

/// Running totals for one obligation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerTotals {
    pub total_due: Decimal,
    pub total_paid: Decimal,
    /// `total_due - total_paid`; negative when the member paid ahead.
    pub outstanding_balance: Decimal,
}

/// Sums what was due over every projected instance against everything paid.
///
/// Every transaction passed in is counted; callers pass only the records of the
/// obligation that produced `instances`.
pub fn accumulate(
    instances: &[ScheduleInstance],
    transactions: &[TransactionRecord],
) -> LedgerTotals {
    let total_due: Decimal = instances.iter().map(|inst| inst.expected_amount).sum();
    let total_paid: Decimal = transactions.iter().map(|txn| txn.amount).sum();
    LedgerTotals {
        total_due,
        total_paid,
        outstanding_balance: total_due - total_paid,
    }
}

/// Interest and principal movement of one elapsed period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccrualPeriod {
    pub due_date: NaiveDate,
    pub opening_principal: Decimal,
    pub interest: Decimal,
    pub paid: Decimal,
    pub closing_principal: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InterestAccrual {
    pub interest_type: InterestType,
    pub rate_per_period: Decimal,
    pub accrued_interest: Decimal,
    pub interest_paid: Decimal,
    pub unpaid_interest: Decimal,
    pub principal_paid: Decimal,
    pub principal_balance: Decimal,
    pub periods: Vec<AccrualPeriod>,
}

/// Walks the elapsed periods of a loan in order. Each period accrues interest
/// first, then applies the installments paid in it: unpaid interest is settled
/// before principal is reduced.
///
/// A payment belongs to the latest period whose due date is on or before it;
/// payments made before the first due date count toward the first period. With no
/// elapsed period every payment goes straight to principal.
///
/// Flat interest stops once the opening principal is fully repaid. As with
/// [`accumulate`], `transactions` must already be limited to this loan.
pub fn accrue_interest(
    terms: &InterestTerms,
    instances: &[ScheduleInstance],
    transactions: &[TransactionRecord],
) -> InterestAccrual {
    let mut paid_per_period = vec![Decimal::ZERO; instances.len()];
    let mut unallocated = Decimal::ZERO;
    for txn in transactions {
        match period_index(instances, txn.occurred_on) {
            Some(idx) => paid_per_period[idx] += txn.amount,
            None => unallocated += txn.amount,
        }
    }

    let mut principal = terms.principal;
    let mut accrued_interest = Decimal::ZERO;
    let mut unpaid_interest = Decimal::ZERO;
    let mut interest_paid = Decimal::ZERO;
    let mut principal_paid = Decimal::ZERO;
    let mut periods = Vec::with_capacity(instances.len());

    for (instance, paid) in instances.iter().zip(paid_per_period) {
        let opening_principal = principal;
        let base = match terms.interest_type {
            InterestType::Flat if opening_principal > Decimal::ZERO => terms.principal,
            InterestType::Flat => Decimal::ZERO,
            // Prepaid (negative) principal earns nothing.
            InterestType::ReducingBalance => opening_principal.max(Decimal::ZERO),
        };
        let interest = round_interest(base * terms.rate_per_period);
        accrued_interest += interest;
        unpaid_interest += interest;

        let to_interest = paid.min(unpaid_interest);
        unpaid_interest -= to_interest;
        interest_paid += to_interest;

        let to_principal = paid - to_interest;
        principal -= to_principal;
        principal_paid += to_principal;

        periods.push(AccrualPeriod {
            due_date: instance.due_date,
            opening_principal,
            interest,
            paid,
            closing_principal: principal,
        });
    }

    principal -= unallocated;
    principal_paid += unallocated;

    InterestAccrual {
        interest_type: terms.interest_type,
        rate_per_period: terms.rate_per_period,
        accrued_interest,
        interest_paid,
        unpaid_interest,
        principal_paid,
        principal_balance: principal,
        periods,
    }
}

fn period_index(instances: &[ScheduleInstance], date: NaiveDate) -> Option<usize> {
    if instances.is_empty() {
        return None;
    }
    let started = instances.partition_point(|inst| inst.due_date <= date);
    Some(started.saturating_sub(1))
}

fn round_interest(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(INTEREST_SCALE, RoundingStrategy::MidpointAwayFromZero)
}
