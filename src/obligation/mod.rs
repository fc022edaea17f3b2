//! Obligation schedules, payment matching, and balance ledgers. Pure functions only.

pub mod cadence;
pub mod definition;
pub mod ledger;
pub mod matcher;
pub mod next_due;
pub mod reconciliation;
pub mod schedule;

pub use cadence::{step, Cadence, PeriodKey};
pub use definition::{
    InterestTerms, InterestType, ObligationDefinition, ObligationKind, TransactionRecord,
};
pub use ledger::{accrue_interest, accumulate, AccrualPeriod, InterestAccrual, LedgerTotals};
pub use matcher::{reconcile, Matched};
pub use next_due::{next_due, next_due_with};
pub use reconciliation::{reconcile_obligation, reconcile_obligation_with, ReconciliationResult};
pub use schedule::{project, project_with, DayAnchoring, ScheduleInstance, ScheduleOptions};
