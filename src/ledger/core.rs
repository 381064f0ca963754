//! Ledger shell that stores records and derives balances on demand

use chrono::NaiveDate;
use tracing::{debug, info, instrument};

use crate::config::{LedgerConfig, ReferenceMode};
use crate::ledger::engine::{BalanceEngine, OutstandingBalances};
use crate::ledger::statement::{party_statement, PartyStatement};
use crate::traits::*;
use crate::types::*;
use crate::utils::validation::find_unresolved_references;

/// Record keeping over a [`RecordStore`], with balances derived by the engine
///
/// No balance is ever stored: every query loads the full party and
/// transaction sets and replays them.
pub struct Ledger<S: RecordStore> {
    storage: S,
    engine: BalanceEngine,
    party_validator: Box<dyn PartyValidator>,
    transaction_validator: Box<dyn TransactionValidator>,
}

impl<S: RecordStore> Ledger<S> {
    /// Create a new ledger with the given storage backend
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, LedgerConfig::default())
    }

    /// Create a new ledger with a custom configuration
    pub fn with_config(storage: S, config: LedgerConfig) -> Self {
        Self {
            storage,
            engine: BalanceEngine::new(config),
            party_validator: Box::new(DefaultPartyValidator),
            transaction_validator: Box::new(DefaultTransactionValidator),
        }
    }

    /// Create a new ledger with custom validators
    pub fn with_validators(
        storage: S,
        config: LedgerConfig,
        party_validator: Box<dyn PartyValidator>,
        transaction_validator: Box<dyn TransactionValidator>,
    ) -> Self {
        Self {
            storage,
            engine: BalanceEngine::new(config),
            party_validator,
            transaction_validator,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        self.engine.config()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    // Party operations
    /// Add a new party; ids are never reused
    pub async fn add_party(&mut self, party: MasterParty) -> LedgerResult<MasterParty> {
        self.party_validator.validate_party(&party)?;

        if self.storage.get_party(&party.id).await?.is_some() {
            return Err(LedgerError::Validation(format!(
                "Party with ID '{}' already exists",
                party.id
            )));
        }

        self.storage.save_party(&party).await?;
        debug!(party_id = %party.id, kind = ?party.kind, "party added");
        Ok(party)
    }

    /// Replace an existing party
    pub async fn update_party(&mut self, party: &MasterParty) -> LedgerResult<()> {
        self.party_validator.validate_party(party)?;

        if self.storage.get_party(&party.id).await?.is_none() {
            return Err(LedgerError::PartyNotFound(party.id.clone()));
        }

        self.storage.save_party(party).await
    }

    pub async fn get_party(&self, party_id: &str) -> LedgerResult<Option<MasterParty>> {
        self.storage.get_party(party_id).await
    }

    /// List parties, optionally by kind
    pub async fn list_parties(&self, kind: Option<PartyKind>) -> LedgerResult<Vec<MasterParty>> {
        self.storage.list_parties(kind).await
    }

    /// Remove a party. Postings that still name it are skipped from then on.
    pub async fn remove_party(&mut self, party_id: &str) -> LedgerResult<()> {
        self.storage.delete_party(party_id).await
    }

    // Transaction operations
    /// Record a new transaction
    ///
    /// In strict mode the transaction is rejected if any of its references
    /// do not resolve against the records already stored.
    pub async fn record_transaction(&mut self, transaction: Transaction) -> LedgerResult<()> {
        self.transaction_validator
            .validate_transaction(&transaction)?;

        if self
            .storage
            .get_transaction(transaction.id())
            .await?
            .is_some()
        {
            return Err(LedgerError::Validation(format!(
                "Transaction with ID '{}' already exists",
                transaction.id()
            )));
        }

        self.check_references(&transaction).await?;
        self.storage.save_transaction(&transaction).await?;
        debug!(
            transaction_id = %transaction.id(),
            kind = ?transaction.kind(),
            "transaction recorded"
        );
        Ok(())
    }

    /// Replace an existing transaction
    pub async fn update_transaction(&mut self, transaction: &Transaction) -> LedgerResult<()> {
        self.transaction_validator
            .validate_transaction(transaction)?;

        if self
            .storage
            .get_transaction(transaction.id())
            .await?
            .is_none()
        {
            return Err(LedgerError::TransactionNotFound(
                transaction.id().to_string(),
            ));
        }

        self.check_references(transaction).await?;
        self.storage.save_transaction(transaction).await
    }

    pub async fn get_transaction(&self, transaction_id: &str) -> LedgerResult<Option<Transaction>> {
        self.storage.get_transaction(transaction_id).await
    }

    /// List transactions, optionally by kind and date range
    pub async fn list_transactions(
        &self,
        kind: Option<TransactionKind>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> LedgerResult<Vec<Transaction>> {
        self.storage
            .list_transactions(kind, start_date, end_date)
            .await
    }

    pub async fn delete_transaction(&mut self, transaction_id: &str) -> LedgerResult<()> {
        self.storage.delete_transaction(transaction_id).await
    }

    // Balance operations
    /// Balances over every stored record
    #[instrument(skip(self))]
    pub async fn outstanding_balances(&self) -> LedgerResult<OutstandingBalances> {
        let (parties, transactions) = self.load().await?;
        let balances = self.engine.compute(&parties, &transactions)?;
        info!(
            receivables = balances.receivables.len(),
            payables = balances.payables.len(),
            "outstanding balances derived"
        );
        Ok(balances)
    }

    /// Balances from records dated on or before `as_of`
    #[instrument(skip(self))]
    pub async fn outstanding_balances_as_of(
        &self,
        as_of: NaiveDate,
    ) -> LedgerResult<OutstandingBalances> {
        let (parties, transactions) = self.load().await?;
        self.engine.compute_as_of(&parties, &transactions, as_of)
    }

    /// Running-balance statement for one party
    pub async fn party_statement(
        &self,
        party_id: &str,
        as_of: Option<NaiveDate>,
    ) -> LedgerResult<PartyStatement> {
        let (parties, transactions) = self.load().await?;
        party_statement(&parties, &transactions, party_id, as_of)
    }

    /// References in the stored records that the engine cannot resolve
    pub async fn unresolved_references(&self) -> LedgerResult<Vec<UnresolvedReference>> {
        let (parties, transactions) = self.load().await?;
        Ok(find_unresolved_references(&parties, &transactions))
    }

    async fn load(&self) -> LedgerResult<(Vec<MasterParty>, Vec<Transaction>)> {
        let parties = self.storage.list_parties(None).await?;
        let transactions = self.storage.list_transactions(None, None, None).await?;
        Ok((parties, transactions))
    }

    async fn check_references(&self, transaction: &Transaction) -> LedgerResult<()> {
        if self.engine.config().reference_mode != ReferenceMode::Strict {
            return Ok(());
        }

        let (parties, mut transactions) = self.load().await?;
        transactions.retain(|existing| existing.id() != transaction.id());
        transactions.push(transaction.clone());

        let unresolved: Vec<UnresolvedReference> =
            find_unresolved_references(&parties, &transactions)
                .into_iter()
                .filter(|reference| reference.transaction_id() == transaction.id())
                .collect();

        if unresolved.is_empty() {
            Ok(())
        } else {
            Err(ReferentialIntegrityError { unresolved }.into())
        }
    }
}
