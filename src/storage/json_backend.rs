use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{InMemorySource, ObligationFilter, ObligationSource};
use crate::{
    errors::{EngineError, EngineResult},
    obligation::{
        Cadence, InterestTerms, ObligationDefinition, ObligationKind, TransactionRecord,
    },
    utils::persistence::{load_json, save_json},
};

/// Obligation row as persisted, with the cadence kept as raw text until it passes
/// boundary validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredObligation {
    pub id: Uuid,
    pub party_id: Uuid,
    #[serde(default)]
    pub kind: ObligationKind,
    pub start_date: NaiveDate,
    pub cadence: String,
    pub periodic_amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest: Option<InterestTerms>,
}

impl TryFrom<StoredObligation> for ObligationDefinition {
    type Error = EngineError;

    fn try_from(row: StoredObligation) -> EngineResult<Self> {
        let cadence: Cadence = row.cadence.parse().map_err(|err| match err {
            EngineError::Configuration(msg) => {
                EngineError::Configuration(format!("obligation {}: {}", row.id, msg))
            }
            other => other,
        })?;
        let obligation = ObligationDefinition {
            id: row.id,
            party_id: row.party_id,
            kind: row.kind,
            start_date: row.start_date,
            cadence,
            periodic_amount: row.periodic_amount,
            interest: row.interest,
        };
        obligation.validate()?;
        Ok(obligation)
    }
}

impl From<&ObligationDefinition> for StoredObligation {
    fn from(obligation: &ObligationDefinition) -> Self {
        Self {
            id: obligation.id,
            party_id: obligation.party_id,
            kind: obligation.kind,
            start_date: obligation.start_date,
            cadence: obligation.cadence.label().to_ascii_lowercase(),
            periodic_amount: obligation.periodic_amount,
            interest: obligation.interest.clone(),
        }
    }
}

/// On-disk layout of a snapshot file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub obligations: Vec<StoredObligation>,
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
}

/// Source backed by a single JSON snapshot file, loaded eagerly into memory.
#[derive(Debug, Clone)]
pub struct JsonSnapshotSource {
    path: PathBuf,
    records: InMemorySource,
}

impl JsonSnapshotSource {
    /// Loads and validates every row of the snapshot at `path`.
    pub fn load(path: impl Into<PathBuf>) -> EngineResult<Self> {
        let path = path.into();
        let snapshot: Snapshot = load_json(&path)?;
        let mut records = InMemorySource::new();
        for row in snapshot.obligations {
            records.add_obligation(ObligationDefinition::try_from(row)?)?;
        }
        for txn in snapshot.transactions {
            records.record_transaction(txn)?;
        }
        tracing::debug!(
            path = %path.display(),
            obligations = records.obligations().len(),
            transactions = records.transactions().len(),
            "loaded obligation snapshot"
        );
        Ok(Self { path, records })
    }

    /// Wraps already-validated records so they can be written to `path`.
    pub fn with_records(path: impl Into<PathBuf>, records: InMemorySource) -> Self {
        Self {
            path: path.into(),
            records,
        }
    }

    pub fn save(&self) -> EngineResult<()> {
        let snapshot = Snapshot {
            obligations: self
                .records
                .obligations()
                .iter()
                .map(StoredObligation::from)
                .collect(),
            transactions: self.records.transactions().to_vec(),
        };
        save_json(&snapshot, &self.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &InMemorySource {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut InMemorySource {
        &mut self.records
    }
}

impl ObligationSource for JsonSnapshotSource {
    fn list_obligations(
        &self,
        filter: &ObligationFilter,
    ) -> EngineResult<Vec<ObligationDefinition>> {
        self.records.list_obligations(filter)
    }

    fn list_transactions(&self, obligation_id: Uuid) -> EngineResult<Vec<TransactionRecord>> {
        self.records.list_transactions(obligation_id)
    }
}
