//! Validation utilities for the data-entry layer
//!
//! The balance engine accepts whatever it is given; these checks are for
//! callers that want to reject bad records before they are stored.

use bigdecimal::BigDecimal;
use std::collections::HashSet;

use crate::ledger::engine::{accountable_parties, chronological};
use crate::ledger::posting::{postings_for, OriginalIndex};
use crate::types::*;

/// Validate that an amount is zero or positive
pub fn validate_non_negative_amount(field: &str, amount: &BigDecimal) -> LedgerResult<()> {
    if *amount < BigDecimal::from(0) {
        Err(LedgerError::Validation(format!(
            "{} cannot be negative, got {}",
            field, amount
        )))
    } else {
        Ok(())
    }
}

/// Validate that a record ID is usable
pub fn validate_record_id(field: &str, id: &str) -> LedgerResult<()> {
    if id.trim().is_empty() {
        return Err(LedgerError::Validation(format!("{} cannot be empty", field)));
    }

    if id.len() > 64 {
        return Err(LedgerError::Validation(format!(
            "{} cannot exceed 64 characters",
            field
        )));
    }

    Ok(())
}

/// Validate a master party
pub fn validate_party(party: &MasterParty) -> LedgerResult<()> {
    validate_record_id("Party ID", &party.id)?;

    if party.name.trim().is_empty() {
        return Err(LedgerError::Validation(
            "Party name cannot be empty".to_string(),
        ));
    }

    if let Some(opening) = &party.opening_balance {
        validate_non_negative_amount("Opening balance", opening)?;
        if *opening > BigDecimal::from(0) && party.opening_balance_direction.is_none() {
            return Err(LedgerError::Validation(format!(
                "Party '{}' has an opening balance but no debit/credit direction",
                party.id
            )));
        }
    }

    if let Some(commission) = &party.commission {
        validate_non_negative_amount("Commission", commission)?;
    }

    Ok(())
}

/// Validate a transaction's ids and amounts
pub fn validate_transaction(transaction: &Transaction) -> LedgerResult<()> {
    validate_record_id("Transaction ID", transaction.id())?;

    match transaction {
        Transaction::Purchase(purchase) => {
            validate_record_id("Supplier ID", &purchase.supplier_id)?;
            if let Some(agent_id) = &purchase.agent_id {
                validate_record_id("Agent ID", agent_id)?;
            }
            validate_non_negative_amount("Total amount", &purchase.total_amount)
        }
        Transaction::Sale(sale) => {
            validate_record_id("Customer ID", &sale.customer_id)?;
            if let Some(broker_id) = &sale.broker_id {
                validate_record_id("Broker ID", broker_id)?;
            }
            validate_non_negative_amount("Billed amount", &sale.billed_amount)?;
            validate_non_negative_amount("Brokerage commission", &sale.brokerage_commission)?;
            validate_non_negative_amount("Extra brokerage", &sale.extra_brokerage)
        }
        Transaction::Receipt(receipt) => {
            validate_record_id("Party ID", &receipt.party_id)?;
            validate_non_negative_amount("Amount", &receipt.amount)?;
            validate_non_negative_amount("Cash discount", &receipt.cash_discount)
        }
        Transaction::Payment(payment) => {
            validate_record_id("Party ID", &payment.party_id)?;
            validate_non_negative_amount("Amount", &payment.amount)
        }
        Transaction::PurchaseReturn(ret) => {
            validate_record_id("Original purchase ID", &ret.original_purchase_id)?;
            validate_non_negative_amount("Return amount", &ret.return_amount)
        }
        Transaction::SaleReturn(ret) => {
            validate_record_id("Original sale ID", &ret.original_sale_id)?;
            validate_non_negative_amount("Return amount", &ret.return_amount)
        }
    }
}

/// Every reference the engine would silently skip for this input.
///
/// Covers returns whose original is missing and postings to parties that
/// are absent or not accountable. Each (transaction, party) pair is reported once.
pub fn find_unresolved_references(
    parties: &[MasterParty],
    transactions: &[Transaction],
) -> Vec<UnresolvedReference> {
    let tracked = accountable_parties(parties);
    let index = OriginalIndex::build(transactions);
    let mut unresolved = Vec::new();

    // Same order the engine reports skipped references in
    for transaction in chronological(transactions, None) {
        match postings_for(transaction, &index) {
            Ok(postings) => {
                let mut seen = HashSet::new();
                for posting in postings {
                    if !tracked.contains_key(posting.party_id.as_str())
                        && seen.insert(posting.party_id.clone())
                    {
                        unresolved.push(UnresolvedReference::UnknownParty {
                            transaction_id: posting.transaction_id,
                            party_id: posting.party_id,
                        });
                    }
                }
            }
            Err(reference) => unresolved.push(reference),
        }
    }

    unresolved
}

/// Fail with every unresolved reference, if there are any
pub fn check_referential_integrity(
    parties: &[MasterParty],
    transactions: &[Transaction],
) -> Result<(), ReferentialIntegrityError> {
    let unresolved = find_unresolved_references(parties, transactions);
    if unresolved.is_empty() {
        Ok(())
    } else {
        Err(ReferentialIntegrityError { unresolved })
    }
}
