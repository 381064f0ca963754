//! Per-party statement with a running balance

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ledger::engine::{accountable_parties, chronological};
use crate::ledger::posting::{postings_for, OriginalIndex};
use crate::types::*;

/// One posting on a party's statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementLine {
    pub date: NaiveDate,
    pub transaction_id: String,
    pub kind: TransactionKind,
    pub delta: Amount,
    /// Balance after this line
    pub running_balance: Amount,
}

/// Chronological postings for one party, starting from its opening balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyStatement {
    pub party_id: PartyId,
    pub name: String,
    pub kind: PartyKind,
    pub opening_balance: Amount,
    pub lines: Vec<StatementLine>,
    pub closing_balance: Amount,
}

impl PartyStatement {
    /// Lines dated within `[from, to]`
    pub fn lines_between(&self, from: NaiveDate, to: NaiveDate) -> Vec<&StatementLine> {
        self.lines
            .iter()
            .filter(|line| line.date >= from && line.date <= to)
            .collect()
    }
}

/// Build the statement of `party_id`.
///
/// Same-date lines appear in the order the transactions were supplied.
/// The closing balance always equals the engine's balance for the party.
pub fn party_statement(
    parties: &[MasterParty],
    transactions: &[Transaction],
    party_id: &str,
    as_of: Option<NaiveDate>,
) -> LedgerResult<PartyStatement> {
    let party = accountable_parties(parties)
        .remove(party_id)
        .ok_or_else(|| LedgerError::PartyNotFound(party_id.to_string()))?;

    let index = OriginalIndex::build(transactions);
    let opening_balance = party.signed_opening_balance();
    let mut running_balance = opening_balance.clone();
    let mut lines = Vec::new();

    for transaction in chronological(transactions, as_of) {
        let Ok(postings) = postings_for(transaction, &index) else {
            continue;
        };
        for posting in postings.into_iter().filter(|p| p.party_id == party_id) {
            running_balance += &posting.delta;
            lines.push(StatementLine {
                date: posting.date,
                transaction_id: posting.transaction_id,
                kind: posting.kind,
                delta: posting.delta,
                running_balance: running_balance.clone(),
            });
        }
    }

    Ok(PartyStatement {
        party_id: party.id.clone(),
        name: party.name.clone(),
        kind: party.kind,
        opening_balance,
        lines,
        closing_balance: running_balance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
    }

    fn fixture() -> (Vec<MasterParty>, Vec<Transaction>) {
        let parties = vec![
            MasterParty::new("b1", "Broker", PartyKind::Broker)
                .with_opening_balance(BigDecimal::from(100), BalanceDirection::Debit),
            MasterParty::new("c1", "Customer", PartyKind::Customer),
            MasterParty::new("w1", "Godown", PartyKind::Warehouse),
        ];
        let transactions: Vec<Transaction> = vec![
            Receipt::new("r1", date(9), "b1", BigDecimal::from(4000)).into(),
            Sale::new("x1", date(2), "c1", BigDecimal::from(5000))
                .with_broker("b1", BigDecimal::from(100))
                .into(),
            SaleReturn::new("sr1", date(5), "x1", BigDecimal::from(500)).into(),
        ];
        (parties, transactions)
    }

    #[test]
    fn test_statement_running_balance() {
        let (parties, transactions) = fixture();
        let statement = party_statement(&parties, &transactions, "b1", None).unwrap();

        assert_eq!(statement.opening_balance, BigDecimal::from(100));
        let running: Vec<BigDecimal> = statement
            .lines
            .iter()
            .map(|line| line.running_balance.clone())
            .collect();
        assert_eq!(
            running,
            vec![
                BigDecimal::from(5100),
                BigDecimal::from(5000),
                BigDecimal::from(4500),
                BigDecimal::from(500),
            ]
        );
        assert_eq!(statement.closing_balance, BigDecimal::from(500));
        assert_eq!(statement.lines[2].kind, TransactionKind::SaleReturn);
    }

    #[test]
    fn test_statement_matches_engine_balance() {
        let (parties, transactions) = fixture();
        let statement = party_statement(&parties, &transactions, "b1", None).unwrap();
        let balances = crate::ledger::engine::compute_balances(&parties, &transactions);
        assert_eq!(Some(&statement.closing_balance), balances.balance("b1"));
    }

    #[test]
    fn test_duplicate_party_id_statement_agrees_with_engine() {
        let parties = vec![
            MasterParty::new("x", "First", PartyKind::Customer)
                .with_opening_balance(BigDecimal::from(100), BalanceDirection::Debit),
            MasterParty::new("x", "Second", PartyKind::Supplier)
                .with_opening_balance(BigDecimal::from(300), BalanceDirection::Credit),
        ];
        let statement = party_statement(&parties, &[], "x", None).unwrap();
        let balances = crate::ledger::engine::compute_balances(&parties, &[]);

        assert_eq!(statement.opening_balance, BigDecimal::from(-300));
        assert_eq!(statement.closing_balance, BigDecimal::from(-300));
        assert_eq!(Some(&statement.closing_balance), balances.balance("x"));
    }

    #[test]
    fn test_statement_as_of_and_window() {
        let (parties, transactions) = fixture();
        let statement = party_statement(&parties, &transactions, "b1", Some(date(5))).unwrap();
        assert_eq!(statement.lines.len(), 3);
        assert_eq!(statement.closing_balance, BigDecimal::from(4500));
        assert_eq!(statement.lines_between(date(3), date(31)).len(), 1);
    }

    #[test]
    fn test_untouched_customer_has_empty_statement() {
        let (parties, transactions) = fixture();
        let statement = party_statement(&parties, &transactions, "c1", None).unwrap();
        assert!(statement.lines.is_empty());
        assert_eq!(statement.closing_balance, BigDecimal::from(0));
    }

    #[test]
    fn test_warehouse_and_unknown_have_no_statement() {
        let (parties, transactions) = fixture();
        assert!(matches!(
            party_statement(&parties, &transactions, "w1", None),
            Err(LedgerError::PartyNotFound(_))
        ));
        assert!(matches!(
            party_statement(&parties, &transactions, "ghost", None),
            Err(LedgerError::PartyNotFound(_))
        ));
    }
}
