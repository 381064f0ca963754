//! # Party Ledger
//!
//! Outstanding-balance engine for a trading business that deals with
//! customers, suppliers, agents, brokers, transporters and expense heads.
//!
//! ## Features
//!
//! - **Opening balances**: debit/credit seeds per party
//! - **Posting rules**: purchases, sales (with brokerage), receipts, payments and returns,
//!   charged to the agent or broker when one is involved
//! - **Classification**: receivables and payables, largest first, with a settlement epsilon
//! - **Strict mode**: optional failure on dangling returns and unknown parties
//! - **Statements**: per-party running balances
//! - **Storage abstraction**: async record store trait with an in-memory implementation
//!
//! ## Quick Start
//!
//! ```rust
//! use party_ledger::{compute_balances, MasterParty, PartyKind, Sale, Transaction};
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//!
//! let parties = vec![
//!     MasterParty::new("C1", "Customer", PartyKind::Customer),
//!     MasterParty::new("B1", "Broker", PartyKind::Broker),
//! ];
//! let sale: Transaction = Sale::new(
//!     "S1",
//!     NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
//!     "C1",
//!     BigDecimal::from(10000),
//! )
//! .with_broker("B1", BigDecimal::from(200))
//! .into();
//!
//! let result = compute_balances(&parties, &[sale]);
//! assert_eq!(result.balance("B1"), Some(&BigDecimal::from(9800)));
//! assert_eq!(result.balance("C1"), Some(&BigDecimal::from(0)));
//! ```

pub mod config;
pub mod ledger;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::*;
pub use ledger::*;
pub use traits::*;
pub use types::*;
