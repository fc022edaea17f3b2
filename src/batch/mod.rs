//! Parallel reconciliation across many obligations, e.g. "which members have
//! missing contributions as of a date".

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use chrono::NaiveDate;
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    config::EngineConfig,
    errors::{EngineError, EngineResult},
    obligation::{reconcile_obligation_with, ReconciliationResult, ScheduleOptions},
    storage::{ObligationFilter, ObligationSource},
};

/// Cooperative cancellation flag, checked between obligations.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchFailure {
    pub obligation_id: Uuid,
    pub party_id: Uuid,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MissingSummary {
    pub obligation_id: Uuid,
    pub missing: Vec<NaiveDate>,
    pub outstanding_balance: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub as_of: NaiveDate,
    pub results: Vec<ReconciliationResult>,
    pub failures: Vec<BatchFailure>,
    /// Obligations never started because the batch was cancelled.
    pub skipped: usize,
    pub cancelled: bool,
}

impl BatchReport {
    /// Groups every result with at least one missing period by party.
    pub fn members_with_missing(&self) -> BTreeMap<Uuid, Vec<MissingSummary>> {
        let mut members: BTreeMap<Uuid, Vec<MissingSummary>> = BTreeMap::new();
        for result in self.results.iter().filter(|result| !result.is_current()) {
            members
                .entry(result.party_id)
                .or_default()
                .push(MissingSummary {
                    obligation_id: result.obligation_id,
                    missing: result.missing.iter().map(|inst| inst.due_date).collect(),
                    outstanding_balance: result.outstanding_balance,
                });
        }
        members
    }

    pub fn total_outstanding(&self) -> Decimal {
        self.results
            .iter()
            .map(|result| result.outstanding_balance)
            .sum()
    }
}

enum Outcome {
    Done(Box<ReconciliationResult>),
    Failed(BatchFailure),
    Skipped,
}

/// Reconciles every obligation a source lists, fanning out over a bounded pool.
#[derive(Debug, Clone, Default)]
pub struct BatchReconciler {
    schedule: ScheduleOptions,
    worker_threads: Option<usize>,
}

impl BatchReconciler {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            schedule: config.schedule.clone(),
            worker_threads: config.batch.worker_threads,
        }
    }

    /// A failing obligation is reported in [`BatchReport::failures`] and does not
    /// stop the batch; only listing the obligations themselves can fail the run.
    pub fn run<S>(
        &self,
        source: &S,
        filter: &ObligationFilter,
        as_of: NaiveDate,
        cancel: &CancellationToken,
    ) -> EngineResult<BatchReport>
    where
        S: ObligationSource + ?Sized,
    {
        let obligations = source.list_obligations(filter)?;
        info!(obligations = obligations.len(), %as_of, "starting batch reconciliation");

        let pool = self.build_pool()?;
        let outcomes: Vec<Outcome> = pool.install(|| {
            obligations
                .par_iter()
                .map(|obligation| {
                    if cancel.is_cancelled() {
                        return Outcome::Skipped;
                    }
                    let reconciled = source.list_transactions(obligation.id).and_then(|txns| {
                        reconcile_obligation_with(obligation, &txns, as_of, &self.schedule)
                    });
                    match reconciled {
                        Ok(result) => Outcome::Done(Box::new(result)),
                        Err(err) => {
                            warn!(obligation = %obligation.id, error = %err, "reconciliation failed");
                            Outcome::Failed(BatchFailure {
                                obligation_id: obligation.id,
                                party_id: obligation.party_id,
                                error: err.to_string(),
                            })
                        }
                    }
                })
                .collect()
        });

        let mut report = BatchReport {
            as_of,
            results: Vec::new(),
            failures: Vec::new(),
            skipped: 0,
            cancelled: false,
        };
        for outcome in outcomes {
            match outcome {
                Outcome::Done(result) => report.results.push(*result),
                Outcome::Failed(failure) => report.failures.push(failure),
                Outcome::Skipped => report.skipped += 1,
            }
        }
        report.cancelled = report.skipped > 0;
        report
            .results
            .sort_by_key(|result| (result.party_id, result.obligation_id));
        report
            .failures
            .sort_by_key(|failure| (failure.party_id, failure.obligation_id));

        info!(
            reconciled = report.results.len(),
            failed = report.failures.len(),
            skipped = report.skipped,
            "finished batch reconciliation"
        );
        Ok(report)
    }

    fn build_pool(&self) -> EngineResult<rayon::ThreadPool> {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(threads) = self.worker_threads {
            builder = builder.num_threads(threads);
        }
        builder
            .build()
            .map_err(|err| EngineError::configuration(format!("batch worker pool: {err}")))
    }
}
