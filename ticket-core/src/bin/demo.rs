//! End-to-end TicketRail demo
//!
//! Wires the platform services, payment engine, and box office together and
//! drives one full ticket lifecycle: create, mint, list, resale, redeem,
//! fee withdrawal.
//!
//! ```text
//! RUST_LOG=info cargo run --bin ticketrail-demo
//! ```

use anyhow::Result;
use chrono::{Duration, Utc};
use platform::{
    AccessControl, AccountId, Amount, NotificationBus, PauseSwitch, Role, SettlementBank,
    SystemClock,
};
use std::sync::Arc;
use ticket_core::{BoxOffice, Config, EventSpec};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let admin = AccountId::new("root");
    let organizer = AccountId::new("organizer-1");
    let alice = AccountId::new("alice");
    let bob = AccountId::new("bob");
    let config = Config::default();

    // Static wiring: roles, bank balances, shared services
    let access = Arc::new(AccessControl::with_admin(admin.clone()));
    access.grant_role(Role::Organizer, organizer.clone(), &admin)?;
    access.grant_role(Role::FeeManager, admin.clone(), &admin)?;
    access.grant_role(
        Role::TicketIssuer,
        AccountId::new(config.service_account.clone()),
        &admin,
    )?;

    let bank = Arc::new(SettlementBank::new());
    bank.deposit(&alice, Amount::from(500));
    bank.deposit(&bob, Amount::from(500));

    let pause = Arc::new(PauseSwitch::new(access.clone()));
    let bus = Arc::new(NotificationBus::new(256));
    let payment_engine = Arc::new(payments::PaymentEngine::new(
        payments::Config {
            fee_rate_ppm: 100, // 10%
            ..Default::default()
        },
        bank.clone(),
        access.clone(),
        pause,
        bus.clone(),
    )?);

    let office = BoxOffice::open(
        config,
        payment_engine.clone(),
        access,
        bus,
        Arc::new(SystemClock),
    );

    // Create an event that starts almost immediately
    let start = Utc::now() + Duration::seconds(2);
    let event_id = office
        .create_event(
            organizer.clone(),
            EventSpec {
                name: "TicketRail Launch Night".to_string(),
                description: "Demo run".to_string(),
                venue: "Main Hall".to_string(),
                start_time: start,
                end_time: start + Duration::hours(2),
                base_price: Amount::from(50),
                max_tickets: 100,
                seated: true,
                resale_allowed: true,
                max_resale_price: Amount::from(120),
            },
        )
        .await?;
    tracing::info!(%event_id, "event on sale");

    // Alice buys two seats, one of them for Bob
    let minted = office
        .mint_tickets(
            event_id,
            vec![alice.clone(), bob.clone()],
            vec![11, 12],
            Amount::from(100),
            alice.clone(),
        )
        .await?;
    tracing::info!(?minted, "primary sale complete");

    // Alice flips her seat to Bob at the cap
    office
        .list_ticket_for_resale(minted[0], Amount::from(120), alice.clone())
        .await?;
    office
        .buy_resale_ticket(minted[0], Amount::from(120), bob.clone())
        .await?;
    tracing::info!(ticket = %minted[0], "resale complete");

    // Wait for the doors to open, then redeem both tickets
    tokio::time::sleep(std::time::Duration::from_secs(2)).await;
    office.use_ticket(minted[0], bob.clone()).await?;
    office.use_ticket(minted[1], bob.clone()).await?;
    tracing::info!("tickets redeemed");

    let collected = payment_engine.withdraw_fees(&admin)?;
    tracing::info!(%collected, "platform fees withdrawn");

    tracing::info!(
        organizer_balance = %bank.balance_of(&organizer),
        alice_balance = %bank.balance_of(&alice),
        bob_balance = %bank.balance_of(&bob),
        admin_balance = %bank.balance_of(&admin),
        "final balances"
    );

    office.shutdown().await?;
    Ok(())
}
