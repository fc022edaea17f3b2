use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cadence::Cadence;
use crate::errors::{EngineError, EngineResult};

/// Business category of a recurring obligation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum ObligationKind {
    HealthPremium,
    MortuaryContribution,
    LoanInstallment,
    #[default]
    Other,
}

/// How interest is charged on an interest-bearing obligation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum InterestType {
    /// Every period charges interest on the original principal.
    #[default]
    Flat,
    /// Every period charges interest on the principal still outstanding.
    ReducingBalance,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InterestTerms {
    pub principal: Decimal,
    /// Rate charged per elapsed period, e.g. `0.01` for one percent.
    pub rate_per_period: Decimal,
    #[serde(default)]
    pub interest_type: InterestType,
}

impl InterestTerms {
    pub fn new(principal: Decimal, rate_per_period: Decimal, interest_type: InterestType) -> Self {
        Self {
            principal,
            rate_per_period,
            interest_type,
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        if is_negative(self.principal) {
            return Err(EngineError::validation(format!(
                "interest principal must not be negative (got {})",
                self.principal
            )));
        }
        if is_negative(self.rate_per_period) {
            return Err(EngineError::validation(format!(
                "interest rate must not be negative (got {})",
                self.rate_per_period
            )));
        }
        Ok(())
    }
}

/// One recurring duty owed by one party.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObligationDefinition {
    pub id: Uuid,
    pub party_id: Uuid,
    #[serde(default)]
    pub kind: ObligationKind,
    pub start_date: NaiveDate,
    pub cadence: Cadence,
    pub periodic_amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest: Option<InterestTerms>,
}

impl ObligationDefinition {
    pub fn new(
        party_id: Uuid,
        kind: ObligationKind,
        start_date: NaiveDate,
        cadence: Cadence,
        periodic_amount: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            party_id,
            kind,
            start_date,
            cadence,
            periodic_amount,
            interest: None,
        }
    }

    pub fn with_interest(mut self, terms: InterestTerms) -> Self {
        self.interest = Some(terms);
        self
    }

    pub fn is_interest_bearing(&self) -> bool {
        self.interest.is_some()
    }

    /// Boundary check run before any engine computation.
    pub fn validate(&self) -> EngineResult<()> {
        if is_negative(self.periodic_amount) {
            return Err(EngineError::validation(format!(
                "obligation {} has negative periodic amount {}",
                self.id, self.periodic_amount
            )));
        }
        if let Some(terms) = &self.interest {
            terms.validate()?;
        }
        Ok(())
    }
}

/// One recorded payment against an obligation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionRecord {
    pub id: Uuid,
    pub obligation_id: Uuid,
    pub amount: Decimal,
    pub occurred_on: NaiveDate,
}

impl TransactionRecord {
    pub fn new(obligation_id: Uuid, amount: Decimal, occurred_on: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            obligation_id,
            amount,
            occurred_on,
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        if is_negative(self.amount) {
            return Err(EngineError::validation(format!(
                "transaction {} has negative amount {}",
                self.id, self.amount
            )));
        }
        Ok(())
    }
}

fn is_negative(value: Decimal) -> bool {
    value < Decimal::ZERO
}
