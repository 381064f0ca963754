//! In-memory record store for testing

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::traits::*;
use crate::types::*;

/// In-memory storage implementation for testing and development
///
/// Clones share the same underlying maps. Transactions are listed in
/// insertion order so same-date records replay in the order they were saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    parties: Arc<RwLock<HashMap<String, MasterParty>>>,
    transactions: Arc<RwLock<Vec<Transaction>>>,
}

fn read<T>(lock: &RwLock<T>) -> LedgerResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|e| LedgerError::Storage(format!("lock poisoned: {}", e)))
}

fn write<T>(lock: &RwLock<T>) -> LedgerResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|e| LedgerError::Storage(format!("lock poisoned: {}", e)))
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> LedgerResult<()> {
        write(&self.parties)?.clear();
        write(&self.transactions)?.clear();
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStorage {
    async fn save_party(&mut self, party: &MasterParty) -> LedgerResult<()> {
        write(&self.parties)?.insert(party.id.clone(), party.clone());
        Ok(())
    }

    async fn get_party(&self, party_id: &str) -> LedgerResult<Option<MasterParty>> {
        Ok(read(&self.parties)?.get(party_id).cloned())
    }

    async fn list_parties(&self, kind: Option<PartyKind>) -> LedgerResult<Vec<MasterParty>> {
        let parties = read(&self.parties)?;
        let mut filtered: Vec<MasterParty> = parties
            .values()
            .filter(|party| kind.is_none_or(|k| party.kind == k))
            .cloned()
            .collect();
        filtered.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(filtered)
    }

    async fn delete_party(&mut self, party_id: &str) -> LedgerResult<()> {
        if write(&self.parties)?.remove(party_id).is_some() {
            Ok(())
        } else {
            Err(LedgerError::PartyNotFound(party_id.to_string()))
        }
    }

    async fn save_transaction(&mut self, transaction: &Transaction) -> LedgerResult<()> {
        let mut transactions = write(&self.transactions)?;
        match transactions
            .iter_mut()
            .find(|existing| existing.id() == transaction.id())
        {
            Some(existing) => *existing = transaction.clone(),
            None => transactions.push(transaction.clone()),
        }
        Ok(())
    }

    async fn get_transaction(&self, transaction_id: &str) -> LedgerResult<Option<Transaction>> {
        Ok(read(&self.transactions)?
            .iter()
            .find(|txn| txn.id() == transaction_id)
            .cloned())
    }

    async fn list_transactions(
        &self,
        kind: Option<TransactionKind>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> LedgerResult<Vec<Transaction>> {
        let transactions = read(&self.transactions)?;
        let filtered: Vec<Transaction> = transactions
            .iter()
            .filter(|txn| {
                if let Some(kind) = kind {
                    if txn.kind() != kind {
                        return false;
                    }
                }
                if let Some(start) = start_date {
                    if txn.date() < start {
                        return false;
                    }
                }
                if let Some(end) = end_date {
                    if txn.date() > end {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();
        Ok(filtered)
    }

    async fn delete_transaction(&mut self, transaction_id: &str) -> LedgerResult<()> {
        let mut transactions = write(&self.transactions)?;
        let before = transactions.len();
        transactions.retain(|txn| txn.id() != transaction_id);
        if transactions.len() < before {
            Ok(())
        } else {
            Err(LedgerError::TransactionNotFound(
                transaction_id.to_string(),
            ))
        }
    }
}
