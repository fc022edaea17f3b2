pub mod json_backend;
pub mod memory;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    errors::EngineResult,
    obligation::{ObligationDefinition, ObligationKind, TransactionRecord},
};

/// Selection criteria for [`ObligationSource::list_obligations`]. Unset fields
/// match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObligationFilter {
    pub party_id: Option<Uuid>,
    pub kind: Option<ObligationKind>,
    pub started_on_or_before: Option<NaiveDate>,
}

impl ObligationFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_party(party_id: Uuid) -> Self {
        Self {
            party_id: Some(party_id),
            ..Self::default()
        }
    }

    pub fn of_kind(mut self, kind: ObligationKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn started_by(mut self, date: NaiveDate) -> Self {
        self.started_on_or_before = Some(date);
        self
    }

    pub fn matches(&self, obligation: &ObligationDefinition) -> bool {
        self.party_id.map_or(true, |id| obligation.party_id == id)
            && self.kind.map_or(true, |kind| obligation.kind == kind)
            && self
                .started_on_or_before
                .map_or(true, |date| obligation.start_date <= date)
    }
}

/// Persistence collaborator that owns obligation definitions and payment records.
/// The engine only reads through this boundary.
pub trait ObligationSource: Send + Sync {
    fn list_obligations(&self, filter: &ObligationFilter)
        -> EngineResult<Vec<ObligationDefinition>>;
    fn list_transactions(&self, obligation_id: Uuid) -> EngineResult<Vec<TransactionRecord>>;
}

pub use json_backend::{JsonSnapshotSource, Snapshot, StoredObligation};
pub use memory::InMemorySource;
