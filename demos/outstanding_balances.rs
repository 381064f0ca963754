//! Outstanding balances for a small grain-trading book

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use party_ledger::utils::MemoryStorage;
use party_ledger::{
    BalanceDirection, Ledger, MasterParty, PartyKind, Payment, Purchase, PurchaseReturn, Receipt,
    Sale, SaleReturn,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut ledger = Ledger::new(MemoryStorage::new());

    println!("Setting up parties...");
    let parties = vec![
        MasterParty::new("C1", "Lakshmi Stores", PartyKind::Customer)
            .with_opening_balance(BigDecimal::from(1500), BalanceDirection::Debit),
        MasterParty::new("C2", "Green Valley Foods", PartyKind::Customer),
        MasterParty::new("S1", "Krishna Mills", PartyKind::Supplier)
            .with_opening_balance(BigDecimal::from(500), BalanceDirection::Credit),
        MasterParty::new("A1", "Ramesh Agency", PartyKind::Agent),
        MasterParty::new("B1", "Sharma Brokers", PartyKind::Broker),
        MasterParty::new("W1", "Main Godown", PartyKind::Warehouse),
    ];
    for party in parties {
        let party = ledger.add_party(party).await?;
        println!("  + {} - {} ({:?})", party.id, party.name, party.kind);
    }

    let day = |d: u32| NaiveDate::from_ymd_opt(2024, 4, d).ok_or("invalid date");

    println!("\nRecording transactions...");
    ledger
        .record_transaction(Purchase::new("P1", day(2)?, "S1", BigDecimal::from(2000)).into())
        .await?;
    ledger
        .record_transaction(
            Purchase::new("P2", day(3)?, "S1", BigDecimal::from(8000))
                .with_agent("A1")
                .into(),
        )
        .await?;
    ledger
        .record_transaction(Sale::new("X1", day(5)?, "C1", BigDecimal::from(4250)).into())
        .await?;
    ledger
        .record_transaction(
            Sale::new("X2", day(6)?, "C2", BigDecimal::from(12000))
                .with_broker("B1", BigDecimal::from(240))
                .into(),
        )
        .await?;
    ledger
        .record_transaction(
            Receipt::new("R1", day(10)?, "C1", BigDecimal::from(3000))
                .with_cash_discount(BigDecimal::from(50))
                .into(),
        )
        .await?;
    ledger
        .record_transaction(Payment::new("PAY1", day(11)?, "A1", BigDecimal::from(5000)).into())
        .await?;
    ledger
        .record_transaction(PurchaseReturn::new("PR1", day(12)?, "P2", BigDecimal::from(1000)).into())
        .await?;
    ledger
        .record_transaction(SaleReturn::new("SR1", day(13)?, "X2", BigDecimal::from(2000)).into())
        .await?;

    let balances = ledger.outstanding_balances().await?;

    println!("\nReceivables:");
    for entry in &balances.receivables {
        println!("  {:<20} {:>12}", entry.name, entry.balance);
    }
    println!("  {:<20} {:>12}", "Total", balances.total_receivable());

    println!("\nPayables:");
    for entry in &balances.payables {
        println!("  {:<20} {:>12}", entry.name, entry.balance.abs());
    }
    println!("  {:<20} {:>12}", "Total", balances.total_payable());

    let statement = ledger.party_statement("B1", None).await?;
    println!("\nStatement for {}:", statement.name);
    println!("  opening {:>28}", statement.opening_balance);
    for line in &statement.lines {
        println!(
            "  {} {:<6} {:>10} {:>12}",
            line.date, line.transaction_id, line.delta, line.running_balance
        );
    }
    println!("  closing {:>28}", statement.closing_balance);

    Ok(())
}
