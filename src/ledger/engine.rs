//! Outstanding-balance engine
//!
//! Balances are recomputed from scratch on every call: parties are seeded
//! with their opening balances, transactions are replayed in date order
//! through the posting rules, and the result is split into receivables and
//! payables. Nothing is cached between calls.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument, warn};

use crate::config::{LedgerConfig, ReferenceMode};
use crate::ledger::posting::{postings_for, OriginalIndex};
use crate::types::*;

/// A party's closing balance, as listed under receivables or payables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyBalance {
    pub party_id: PartyId,
    pub name: String,
    pub kind: PartyKind,
    pub balance: Amount,
}

/// Result of a balance computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutstandingBalances {
    /// Signed balance of every accountable party, including untouched ones
    pub balances: HashMap<PartyId, Amount>,
    /// Parties owing the business, largest debtor first
    pub receivables: Vec<PartyBalance>,
    /// Parties the business owes, largest creditor first
    pub payables: Vec<PartyBalance>,
    /// References skipped during replay
    pub skipped: Vec<UnresolvedReference>,
}

impl OutstandingBalances {
    pub fn balance(&self, party_id: &str) -> Option<&Amount> {
        self.balances.get(party_id)
    }

    /// Sum owed to the business
    pub fn total_receivable(&self) -> Amount {
        self.receivables.iter().map(|pb| &pb.balance).sum()
    }

    /// Sum the business owes, as a positive magnitude
    pub fn total_payable(&self) -> Amount {
        let total: BigDecimal = self.payables.iter().map(|pb| &pb.balance).sum();
        total.abs()
    }

    pub fn is_receivable(&self, party_id: &str) -> bool {
        self.receivables.iter().any(|pb| pb.party_id == party_id)
    }

    pub fn is_payable(&self, party_id: &str) -> bool {
        self.payables.iter().any(|pb| pb.party_id == party_id)
    }
}

/// Balance engine bound to a configuration
#[derive(Debug, Clone, Default)]
pub struct BalanceEngine {
    config: LedgerConfig,
}

impl BalanceEngine {
    pub fn new(config: LedgerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Compute balances over the full transaction set.
    ///
    /// In strict mode any unresolved reference fails the call.
    pub fn compute(
        &self,
        parties: &[MasterParty],
        transactions: &[Transaction],
    ) -> LedgerResult<OutstandingBalances> {
        self.run(parties, transactions, None)
    }

    /// Compute balances from transactions dated on or before `as_of`
    pub fn compute_as_of(
        &self,
        parties: &[MasterParty],
        transactions: &[Transaction],
        as_of: NaiveDate,
    ) -> LedgerResult<OutstandingBalances> {
        self.run(parties, transactions, Some(as_of))
    }

    fn run(
        &self,
        parties: &[MasterParty],
        transactions: &[Transaction],
        as_of: Option<NaiveDate>,
    ) -> LedgerResult<OutstandingBalances> {
        let outcome = replay(
            parties,
            transactions,
            as_of,
            &self.config.settlement_epsilon,
        );
        match self.config.reference_mode {
            ReferenceMode::Strict if !outcome.skipped.is_empty() => {
                warn!(
                    unresolved = outcome.skipped.len(),
                    "refusing balances with unresolved references"
                );
                Err(ReferentialIntegrityError {
                    unresolved: outcome.skipped,
                }
                .into())
            }
            _ => Ok(outcome),
        }
    }
}

/// Compute every party's balance with the default, lenient settings.
///
/// Never fails: dangling returns and postings to unknown parties are skipped.
pub fn compute_balances(
    parties: &[MasterParty],
    transactions: &[Transaction],
) -> OutstandingBalances {
    replay(
        parties,
        transactions,
        None,
        &crate::config::default_settlement_epsilon(),
    )
}

/// Like [`compute_balances`], ignoring transactions dated after `as_of`
pub fn compute_balances_as_of(
    parties: &[MasterParty],
    transactions: &[Transaction],
    as_of: NaiveDate,
) -> OutstandingBalances {
    replay(
        parties,
        transactions,
        Some(as_of),
        &crate::config::default_settlement_epsilon(),
    )
}

/// Compute balances, failing if any reference cannot be resolved
pub fn compute_balances_strict(
    parties: &[MasterParty],
    transactions: &[Transaction],
) -> Result<OutstandingBalances, ReferentialIntegrityError> {
    let outcome = compute_balances(parties, transactions);
    if outcome.skipped.is_empty() {
        Ok(outcome)
    } else {
        warn!(
            unresolved = outcome.skipped.len(),
            "refusing balances with unresolved references"
        );
        Err(ReferentialIntegrityError {
            unresolved: outcome.skipped,
        })
    }
}

/// Accountable parties by id. When an id repeats, the last party wins.
pub(crate) fn accountable_parties(parties: &[MasterParty]) -> HashMap<&str, &MasterParty> {
    parties
        .iter()
        .filter(|party| party.kind.is_accountable())
        .map(|party| (party.id.as_str(), party))
        .collect()
}

/// Opening balances of every accountable party
pub(crate) fn seed_balances(parties: &HashMap<&str, &MasterParty>) -> HashMap<PartyId, Amount> {
    parties
        .iter()
        .map(|(id, party)| (id.to_string(), party.signed_opening_balance()))
        .collect()
}

/// Transactions in replay order; same-date transactions keep their input order
pub(crate) fn chronological(
    transactions: &[Transaction],
    as_of: Option<NaiveDate>,
) -> Vec<&Transaction> {
    let mut ordered: Vec<&Transaction> = transactions
        .iter()
        .filter(|txn| as_of.is_none_or(|cutoff| txn.date() <= cutoff))
        .collect();
    ordered.sort_by_key(|txn| txn.date());
    ordered
}

/// Add `delta` to a tracked party; untracked parties are left alone
fn update_balance(balances: &mut HashMap<PartyId, Amount>, party_id: &str, delta: &Amount) -> bool {
    match balances.get_mut(party_id) {
        Some(balance) => {
            *balance += delta;
            true
        }
        None => false,
    }
}

#[instrument(skip_all, fields(parties = parties.len(), transactions = transactions.len()))]
fn replay(
    parties: &[MasterParty],
    transactions: &[Transaction],
    as_of: Option<NaiveDate>,
    epsilon: &BigDecimal,
) -> OutstandingBalances {
    let accountable = accountable_parties(parties);
    let mut balances = seed_balances(&accountable);
    let index = OriginalIndex::build(transactions);
    let mut skipped = Vec::new();

    for transaction in chronological(transactions, as_of) {
        match postings_for(transaction, &index) {
            Ok(postings) => {
                // A sale through an unknown broker posts to it twice; report it once
                let mut reported = HashSet::new();
                for posting in postings {
                    if !update_balance(&mut balances, &posting.party_id, &posting.delta)
                        && reported.insert(posting.party_id.clone())
                    {
                        debug!(
                            transaction_id = %posting.transaction_id,
                            party_id = %posting.party_id,
                            "skipping posting to untracked party"
                        );
                        skipped.push(UnresolvedReference::UnknownParty {
                            transaction_id: posting.transaction_id,
                            party_id: posting.party_id,
                        });
                    }
                }
            }
            Err(unresolved) => {
                debug!(%unresolved, "skipping return with missing original");
                skipped.push(unresolved);
            }
        }
    }

    let (receivables, payables) = classify(&accountable, &balances, epsilon);
    debug!(
        receivables = receivables.len(),
        payables = payables.len(),
        skipped = skipped.len(),
        "balances computed"
    );

    OutstandingBalances {
        balances,
        receivables,
        payables,
        skipped,
    }
}

/// Split balances into receivables and payables, dropping settled parties
fn classify(
    parties: &HashMap<&str, &MasterParty>,
    balances: &HashMap<PartyId, Amount>,
    epsilon: &BigDecimal,
) -> (Vec<PartyBalance>, Vec<PartyBalance>) {
    let negative_epsilon = -epsilon.clone();
    let mut receivables = Vec::new();
    let mut payables = Vec::new();

    for (id, party) in parties {
        let Some(balance) = balances.get(*id) else {
            continue;
        };
        let entry = PartyBalance {
            party_id: party.id.clone(),
            name: party.name.clone(),
            kind: party.kind,
            balance: balance.clone(),
        };
        if balance > epsilon {
            receivables.push(entry);
        } else if *balance < negative_epsilon {
            payables.push(entry);
        }
    }

    receivables.sort_by(|a, b| {
        b.balance
            .cmp(&a.balance)
            .then_with(|| a.party_id.cmp(&b.party_id))
    });
    payables.sort_by(|a, b| {
        a.balance
            .cmp(&b.balance)
            .then_with(|| a.party_id.cmp(&b.party_id))
    });

    (receivables, payables)
}
