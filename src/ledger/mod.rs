//! Ledger module: posting rules, the balance engine, statements and the storage shell

pub mod core;
pub mod engine;
pub mod posting;
pub mod statement;

pub use core::*;
pub use engine::*;
pub use posting::*;
pub use statement::*;
