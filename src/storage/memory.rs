use uuid::Uuid;

use super::{ObligationFilter, ObligationSource};
use crate::{
    errors::{EngineError, EngineResult},
    obligation::{ObligationDefinition, TransactionRecord},
};

/// Vector-backed source used by tests, benches, and callers that already hold
/// their records in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    obligations: Vec<ObligationDefinition>,
    transactions: Vec<TransactionRecord>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and stores an obligation, replacing any previous definition with
    /// the same id.
    pub fn add_obligation(&mut self, obligation: ObligationDefinition) -> EngineResult<Uuid> {
        obligation.validate()?;
        let id = obligation.id;
        self.obligations.retain(|existing| existing.id != id);
        self.obligations.push(obligation);
        Ok(id)
    }

    /// Validates and stores a payment. The referenced obligation must exist.
    pub fn record_transaction(&mut self, transaction: TransactionRecord) -> EngineResult<Uuid> {
        transaction.validate()?;
        if !self
            .obligations
            .iter()
            .any(|obligation| obligation.id == transaction.obligation_id)
        {
            return Err(EngineError::NotFound(transaction.obligation_id));
        }
        let id = transaction.id;
        self.transactions.push(transaction);
        Ok(id)
    }

    /// Removes a payment; corrections are a removal followed by a new record.
    pub fn remove_transaction(&mut self, id: Uuid) -> EngineResult<TransactionRecord> {
        let idx = self
            .transactions
            .iter()
            .position(|txn| txn.id == id)
            .ok_or(EngineError::NotFound(id))?;
        Ok(self.transactions.remove(idx))
    }

    pub fn obligations(&self) -> &[ObligationDefinition] {
        &self.obligations
    }

    pub fn transactions(&self) -> &[TransactionRecord] {
        &self.transactions
    }
}

impl ObligationSource for InMemorySource {
    fn list_obligations(
        &self,
        filter: &ObligationFilter,
    ) -> EngineResult<Vec<ObligationDefinition>> {
        Ok(self
            .obligations
            .iter()
            .filter(|obligation| filter.matches(obligation))
            .cloned()
            .collect())
    }

    fn list_transactions(&self, obligation_id: Uuid) -> EngineResult<Vec<TransactionRecord>> {
        let mut records: Vec<TransactionRecord> = self
            .transactions
            .iter()
            .filter(|txn| txn.obligation_id == obligation_id)
            .cloned()
            .collect();
        records.sort_by_key(|txn| txn.occurred_on);
        Ok(records)
    }
}
