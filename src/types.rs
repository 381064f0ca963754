//! Core types and data structures for the party ledger

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier of a master party. One flat id space covers every party kind.
pub type PartyId = String;

/// Monetary amount in business currency, kept at full precision
pub type Amount = BigDecimal;

/// The role a master party plays in the business
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyKind {
    Customer,
    Supplier,
    Agent,
    Transporter,
    Broker,
    /// Storage location; carries no balance
    Warehouse,
    Expense,
}

impl PartyKind {
    /// Whether parties of this kind take part in balance accounting
    pub fn is_accountable(&self) -> bool {
        !matches!(self, PartyKind::Warehouse)
    }
}

/// Side of an opening balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceDirection {
    /// The party owes the business
    Debit,
    /// The business owes the party
    Credit,
}

/// How an agent or broker commission is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissionType {
    Percentage,
    Fixed,
}

/// Any ledger account: customer, supplier, agent, transporter, broker, warehouse or expense head
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterParty {
    /// Unique identifier, never reused
    pub id: PartyId,
    /// Display name, not guaranteed unique
    pub name: String,
    pub kind: PartyKind,
    /// Non-negative magnitude carried in before any transaction
    #[serde(default)]
    pub opening_balance: Option<Amount>,
    #[serde(default)]
    pub opening_balance_direction: Option<BalanceDirection>,
    /// Agent/broker commission, carried but not posted by the engine
    #[serde(default)]
    pub commission: Option<Amount>,
    #[serde(default)]
    pub commission_type: Option<CommissionType>,
}

impl MasterParty {
    /// Create a party with no opening balance
    pub fn new(id: impl Into<PartyId>, name: impl Into<String>, kind: PartyKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            opening_balance: None,
            opening_balance_direction: None,
            commission: None,
            commission_type: None,
        }
    }

    /// Create a party with a freshly allocated id
    pub fn with_generated_id(name: impl Into<String>, kind: PartyKind) -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), name, kind)
    }

    /// Set the opening balance and its direction
    pub fn with_opening_balance(mut self, amount: Amount, direction: BalanceDirection) -> Self {
        self.opening_balance = Some(amount);
        self.opening_balance_direction = Some(direction);
        self
    }

    /// Set the commission terms
    pub fn with_commission(mut self, commission: Amount, commission_type: CommissionType) -> Self {
        self.commission = Some(commission);
        self.commission_type = Some(commission_type);
        self
    }

    /// Opening balance in the ledger's sign convention.
    ///
    /// Credit balances are negated; debit balances, and balances with no
    /// recorded direction, are returned as-is.
    pub fn signed_opening_balance(&self) -> Amount {
        match (&self.opening_balance, self.opening_balance_direction) {
            (Some(amount), Some(BalanceDirection::Credit)) => -amount.clone(),
            (Some(amount), _) => amount.clone(),
            (None, _) => BigDecimal::from(0),
        }
    }
}

/// Goods bought from a supplier, optionally through an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: String,
    pub date: NaiveDate,
    pub supplier_id: PartyId,
    #[serde(default)]
    pub agent_id: Option<PartyId>,
    pub total_amount: Amount,
}

impl Purchase {
    pub fn new(
        id: impl Into<String>,
        date: NaiveDate,
        supplier_id: impl Into<PartyId>,
        total_amount: Amount,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            supplier_id: supplier_id.into(),
            agent_id: None,
            total_amount,
        }
    }

    /// Route the purchase through an agent
    pub fn with_agent(mut self, agent_id: impl Into<PartyId>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    /// The party charged for this purchase: the agent when present, else the supplier
    pub fn accountable_party(&self) -> &str {
        self.agent_id.as_deref().unwrap_or(&self.supplier_id)
    }
}

/// Goods sold to a customer, optionally through a broker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    pub date: NaiveDate,
    pub customer_id: PartyId,
    #[serde(default)]
    pub broker_id: Option<PartyId>,
    pub billed_amount: Amount,
    #[serde(default)]
    pub brokerage_commission: Amount,
    #[serde(default)]
    pub extra_brokerage: Amount,
}

impl Sale {
    pub fn new(
        id: impl Into<String>,
        date: NaiveDate,
        customer_id: impl Into<PartyId>,
        billed_amount: Amount,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            customer_id: customer_id.into(),
            broker_id: None,
            billed_amount,
            brokerage_commission: BigDecimal::from(0),
            extra_brokerage: BigDecimal::from(0),
        }
    }

    /// Route the sale through a broker earning the given commission
    pub fn with_broker(mut self, broker_id: impl Into<PartyId>, commission: Amount) -> Self {
        self.broker_id = Some(broker_id.into());
        self.brokerage_commission = commission;
        self
    }

    pub fn with_extra_brokerage(mut self, extra: Amount) -> Self {
        self.extra_brokerage = extra;
        self
    }

    /// The party billed for this sale: the broker when present, else the customer
    pub fn accountable_party(&self) -> &str {
        self.broker_id.as_deref().unwrap_or(&self.customer_id)
    }

    /// Commission plus extra brokerage owed to the broker
    pub fn total_brokerage(&self) -> Amount {
        &self.brokerage_commission + &self.extra_brokerage
    }
}

/// Money received from a party
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: String,
    pub date: NaiveDate,
    pub party_id: PartyId,
    pub amount: Amount,
    /// Discount allowed on settlement, credited to the party alongside the amount
    #[serde(default)]
    pub cash_discount: Amount,
}

impl Receipt {
    pub fn new(
        id: impl Into<String>,
        date: NaiveDate,
        party_id: impl Into<PartyId>,
        amount: Amount,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            party_id: party_id.into(),
            amount,
            cash_discount: BigDecimal::from(0),
        }
    }

    pub fn with_cash_discount(mut self, discount: Amount) -> Self {
        self.cash_discount = discount;
        self
    }
}

/// Money paid out to a party
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub date: NaiveDate,
    pub party_id: PartyId,
    pub amount: Amount,
}

impl Payment {
    pub fn new(
        id: impl Into<String>,
        date: NaiveDate,
        party_id: impl Into<PartyId>,
        amount: Amount,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            party_id: party_id.into(),
            amount,
        }
    }
}

/// Goods sent back against an earlier purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseReturn {
    pub id: String,
    pub date: NaiveDate,
    pub original_purchase_id: String,
    pub return_amount: Amount,
}

impl PurchaseReturn {
    pub fn new(
        id: impl Into<String>,
        date: NaiveDate,
        original_purchase_id: impl Into<String>,
        return_amount: Amount,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            original_purchase_id: original_purchase_id.into(),
            return_amount,
        }
    }
}

/// Goods taken back against an earlier sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleReturn {
    pub id: String,
    pub date: NaiveDate,
    pub original_sale_id: String,
    pub return_amount: Amount,
}

impl SaleReturn {
    pub fn new(
        id: impl Into<String>,
        date: NaiveDate,
        original_sale_id: impl Into<String>,
        return_amount: Amount,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            original_sale_id: original_sale_id.into(),
            return_amount,
        }
    }
}

/// Every financial record the engine replays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transaction {
    Purchase(Purchase),
    Sale(Sale),
    Receipt(Receipt),
    Payment(Payment),
    PurchaseReturn(PurchaseReturn),
    SaleReturn(SaleReturn),
}

impl Transaction {
    pub fn id(&self) -> &str {
        match self {
            Transaction::Purchase(t) => &t.id,
            Transaction::Sale(t) => &t.id,
            Transaction::Receipt(t) => &t.id,
            Transaction::Payment(t) => &t.id,
            Transaction::PurchaseReturn(t) => &t.id,
            Transaction::SaleReturn(t) => &t.id,
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            Transaction::Purchase(t) => t.date,
            Transaction::Sale(t) => t.date,
            Transaction::Receipt(t) => t.date,
            Transaction::Payment(t) => t.date,
            Transaction::PurchaseReturn(t) => t.date,
            Transaction::SaleReturn(t) => t.date,
        }
    }

    pub fn kind(&self) -> TransactionKind {
        match self {
            Transaction::Purchase(_) => TransactionKind::Purchase,
            Transaction::Sale(_) => TransactionKind::Sale,
            Transaction::Receipt(_) => TransactionKind::Receipt,
            Transaction::Payment(_) => TransactionKind::Payment,
            Transaction::PurchaseReturn(_) => TransactionKind::PurchaseReturn,
            Transaction::SaleReturn(_) => TransactionKind::SaleReturn,
        }
    }
}

impl From<Purchase> for Transaction {
    fn from(value: Purchase) -> Self {
        Transaction::Purchase(value)
    }
}

impl From<Sale> for Transaction {
    fn from(value: Sale) -> Self {
        Transaction::Sale(value)
    }
}

impl From<Receipt> for Transaction {
    fn from(value: Receipt) -> Self {
        Transaction::Receipt(value)
    }
}

impl From<Payment> for Transaction {
    fn from(value: Payment) -> Self {
        Transaction::Payment(value)
    }
}

impl From<PurchaseReturn> for Transaction {
    fn from(value: PurchaseReturn) -> Self {
        Transaction::PurchaseReturn(value)
    }
}

impl From<SaleReturn> for Transaction {
    fn from(value: SaleReturn) -> Self {
        Transaction::SaleReturn(value)
    }
}

/// Discriminant of [`Transaction`], used for filtering and statements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Purchase,
    Sale,
    Receipt,
    Payment,
    PurchaseReturn,
    SaleReturn,
}

/// A reference the engine could not resolve during replay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum UnresolvedReference {
    /// A purchase return whose original purchase is not in the transaction set
    #[error("purchase return '{return_id}' references missing purchase '{original_purchase_id}'")]
    MissingPurchase {
        return_id: String,
        original_purchase_id: String,
    },
    /// A sale return whose original sale is not in the transaction set
    #[error("sale return '{return_id}' references missing sale '{original_sale_id}'")]
    MissingSale {
        return_id: String,
        original_sale_id: String,
    },
    /// A posting against a party that is absent or not accountable
    #[error("transaction '{transaction_id}' posts to unknown party '{party_id}'")]
    UnknownParty {
        transaction_id: String,
        party_id: PartyId,
    },
}

impl UnresolvedReference {
    /// ID of the transaction carrying the unresolved reference
    pub fn transaction_id(&self) -> &str {
        match self {
            UnresolvedReference::MissingPurchase { return_id, .. }
            | UnresolvedReference::MissingSale { return_id, .. } => return_id,
            UnresolvedReference::UnknownParty { transaction_id, .. } => transaction_id,
        }
    }
}

/// Raised in strict mode when any reference in the input cannot be resolved
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{} unresolved reference(s): {}", .unresolved.len(), join_references(.unresolved))]
pub struct ReferentialIntegrityError {
    pub unresolved: Vec<UnresolvedReference>,
}

fn join_references(references: &[UnresolvedReference]) -> String {
    references
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that can occur in the ledger system
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Party not found: {0}")]
    PartyNotFound(String),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Referential integrity error: {0}")]
    ReferentialIntegrity(#[from] ReferentialIntegrityError),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_signed_opening_balance() {
        let debtor = MasterParty::new("c1", "Ravi Traders", PartyKind::Customer)
            .with_opening_balance(BigDecimal::from(300), BalanceDirection::Debit);
        let creditor = MasterParty::new("s1", "Mill Supplies", PartyKind::Supplier)
            .with_opening_balance(BigDecimal::from(500), BalanceDirection::Credit);
        let fresh = MasterParty::new("a1", "Agent", PartyKind::Agent);

        assert_eq!(debtor.signed_opening_balance(), BigDecimal::from(300));
        assert_eq!(creditor.signed_opening_balance(), BigDecimal::from(-500));
        assert_eq!(fresh.signed_opening_balance(), BigDecimal::from(0));
    }

    #[test]
    fn test_accountable_party_resolution() {
        let purchase = Purchase::new("p1", date(2024, 1, 1), "s1", BigDecimal::from(10));
        assert_eq!(purchase.accountable_party(), "s1");
        assert_eq!(purchase.with_agent("a1").accountable_party(), "a1");

        let sale = Sale::new("x1", date(2024, 1, 1), "c1", BigDecimal::from(10));
        assert_eq!(sale.accountable_party(), "c1");
        let brokered = sale
            .with_broker("b1", BigDecimal::from(2))
            .with_extra_brokerage(BigDecimal::from(1));
        assert_eq!(brokered.accountable_party(), "b1");
        assert_eq!(brokered.total_brokerage(), BigDecimal::from(3));
    }

    #[test]
    fn test_warehouse_is_not_accountable() {
        assert!(!PartyKind::Warehouse.is_accountable());
        assert!(PartyKind::Expense.is_accountable());
        assert!(PartyKind::Transporter.is_accountable());
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        let a = MasterParty::with_generated_id("A", PartyKind::Customer);
        let b = MasterParty::with_generated_id("A", PartyKind::Customer);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_transaction_deserializes_with_defaults() {
        let json = r#"{
            "type": "receipt",
            "id": "r1",
            "date": "2024-03-02",
            "party_id": "c1",
            "amount": "150.25"
        }"#;
        let txn: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(txn.kind(), TransactionKind::Receipt);
        assert_eq!(txn.date(), date(2024, 3, 2));
        match txn {
            Transaction::Receipt(receipt) => {
                assert_eq!(receipt.cash_discount, BigDecimal::from(0));
                assert_eq!(receipt.amount.to_string(), "150.25");
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_referential_integrity_error_message() {
        let err = ReferentialIntegrityError {
            unresolved: vec![UnresolvedReference::MissingSale {
                return_id: "sr1".to_string(),
                original_sale_id: "s404".to_string(),
            }],
        };
        assert_eq!(
            err.to_string(),
            "1 unresolved reference(s): sale return 'sr1' references missing sale 's404'"
        );
    }

    #[test]
    fn test_referential_integrity_error_lists_every_reference() {
        let err = ReferentialIntegrityError {
            unresolved: vec![
                UnresolvedReference::MissingPurchase {
                    return_id: "pr1".to_string(),
                    original_purchase_id: "p404".to_string(),
                },
                UnresolvedReference::UnknownParty {
                    transaction_id: "x1".to_string(),
                    party_id: "b9".to_string(),
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            "2 unresolved reference(s): purchase return 'pr1' references missing purchase 'p404'; \
             transaction 'x1' posts to unknown party 'b9'"
        );

        let wrapped = LedgerError::from(err);
        assert!(wrapped.to_string().starts_with("Referential integrity error: 2 unresolved"));
    }
}
