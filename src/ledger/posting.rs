//! Posting rules: which party a transaction lands on, and by how much
//!
//! Sign convention: a positive delta moves the party towards owing the
//! business (receivable), a negative delta towards being owed (payable).

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::*;

/// A single signed movement on one party's balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub transaction_id: String,
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub party_id: PartyId,
    pub delta: Amount,
}

impl Posting {
    fn new(transaction: &Transaction, party_id: &str, delta: Amount) -> Self {
        Self {
            transaction_id: transaction.id().to_string(),
            date: transaction.date(),
            kind: transaction.kind(),
            party_id: party_id.to_string(),
            delta,
        }
    }
}

/// Lookup of purchases and sales by id, used to resolve returns
#[derive(Debug, Default)]
pub struct OriginalIndex<'a> {
    purchases: HashMap<&'a str, &'a Purchase>,
    sales: HashMap<&'a str, &'a Sale>,
}

impl<'a> OriginalIndex<'a> {
    /// Index every purchase and sale in the set, regardless of date
    pub fn build(transactions: &'a [Transaction]) -> Self {
        let mut index = Self::default();
        for transaction in transactions {
            match transaction {
                Transaction::Purchase(purchase) => {
                    index.purchases.insert(purchase.id.as_str(), purchase);
                }
                Transaction::Sale(sale) => {
                    index.sales.insert(sale.id.as_str(), sale);
                }
                _ => {}
            }
        }
        index
    }

    pub fn purchase(&self, id: &str) -> Option<&'a Purchase> {
        self.purchases.get(id).copied()
    }

    pub fn sale(&self, id: &str) -> Option<&'a Sale> {
        self.sales.get(id).copied()
    }
}

/// Expand a transaction into the postings it produces.
///
/// A return whose original cannot be found yields the unresolved
/// reference instead of postings. Party existence is not checked here.
pub fn postings_for(
    transaction: &Transaction,
    index: &OriginalIndex<'_>,
) -> Result<Vec<Posting>, UnresolvedReference> {
    let postings = match transaction {
        Transaction::Purchase(purchase) => vec![Posting::new(
            transaction,
            purchase.accountable_party(),
            -purchase.total_amount.clone(),
        )],
        Transaction::Sale(sale) => {
            let mut postings = vec![Posting::new(
                transaction,
                sale.accountable_party(),
                sale.billed_amount.clone(),
            )];
            if let Some(broker_id) = &sale.broker_id {
                let brokerage = sale.total_brokerage();
                if brokerage > BigDecimal::from(0) {
                    postings.push(Posting::new(transaction, broker_id, -brokerage));
                }
            }
            postings
        }
        Transaction::Receipt(receipt) => vec![Posting::new(
            transaction,
            &receipt.party_id,
            -(&receipt.amount + &receipt.cash_discount),
        )],
        Transaction::Payment(payment) => vec![Posting::new(
            transaction,
            &payment.party_id,
            payment.amount.clone(),
        )],
        Transaction::PurchaseReturn(ret) => {
            let original = index.purchase(&ret.original_purchase_id).ok_or_else(|| {
                UnresolvedReference::MissingPurchase {
                    return_id: ret.id.clone(),
                    original_purchase_id: ret.original_purchase_id.clone(),
                }
            })?;
            vec![Posting::new(
                transaction,
                original.accountable_party(),
                ret.return_amount.clone(),
            )]
        }
        Transaction::SaleReturn(ret) => {
            let original = index.sale(&ret.original_sale_id).ok_or_else(|| {
                UnresolvedReference::MissingSale {
                    return_id: ret.id.clone(),
                    original_sale_id: ret.original_sale_id.clone(),
                }
            })?;
            vec![Posting::new(
                transaction,
                original.accountable_party(),
                -ret.return_amount.clone(),
            )]
        }
    };
    Ok(postings)
}
