//! Traits for storage abstraction and extensibility

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::types::*;
use crate::utils::validation;

/// Storage abstraction for master parties and transactions
///
/// The engine itself never touches storage: a [`crate::Ledger`] loads the
/// full record set through this trait and hands it to the pure engine.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Save a party, replacing any party with the same id
    async fn save_party(&mut self, party: &MasterParty) -> LedgerResult<()>;

    /// Get a party by ID
    async fn get_party(&self, party_id: &str) -> LedgerResult<Option<MasterParty>>;

    /// List all parties, optionally filtered by kind
    async fn list_parties(&self, kind: Option<PartyKind>) -> LedgerResult<Vec<MasterParty>>;

    /// Delete a party
    async fn delete_party(&mut self, party_id: &str) -> LedgerResult<()>;

    /// Save a transaction, replacing any transaction with the same id
    async fn save_transaction(&mut self, transaction: &Transaction) -> LedgerResult<()>;

    /// Get a transaction by ID
    async fn get_transaction(&self, transaction_id: &str) -> LedgerResult<Option<Transaction>>;

    /// List transactions, optionally filtered by kind and date range
    async fn list_transactions(
        &self,
        kind: Option<TransactionKind>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> LedgerResult<Vec<Transaction>>;

    /// Delete a transaction
    async fn delete_transaction(&mut self, transaction_id: &str) -> LedgerResult<()>;
}

/// Trait for implementing custom party validation rules
pub trait PartyValidator: Send + Sync {
    fn validate_party(&self, party: &MasterParty) -> LedgerResult<()>;
}

/// Trait for implementing custom transaction validation rules
pub trait TransactionValidator: Send + Sync {
    fn validate_transaction(&self, transaction: &Transaction) -> LedgerResult<()>;
}

/// Default party validator: ids, names and opening balances
pub struct DefaultPartyValidator;

impl PartyValidator for DefaultPartyValidator {
    fn validate_party(&self, party: &MasterParty) -> LedgerResult<()> {
        validation::validate_party(party)
    }
}

/// Default transaction validator: ids and non-negative amounts
pub struct DefaultTransactionValidator;

impl TransactionValidator for DefaultTransactionValidator {
    fn validate_transaction(&self, transaction: &Transaction) -> LedgerResult<()> {
        validation::validate_transaction(transaction)
    }
}
