//! Client example demonstrating payment flows against a running server.
//!
//! Run with: cargo run -p payments-app --example client_example --no-default-features --features sqlite

use std::net::SocketAddr;
use std::sync::Arc;

use payment_providers::{ProviderSettings, SimulatedBehavior, simulated_providers};
use payments_client::PaymentsClient;
use payments_hex::{AuditLogListener, EventBus, PaymentService, ProviderRegistry, inbound::HttpServer};
use payments_repo::build_repo;
use payments_types::CreatePaymentRequest;
use rust_decimal::Decimal;
use tempfile::tempdir;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    // Find an available port
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;
    let port = addr.port();
    drop(listener);

    // Use a temp file-backed SQLite DB
    let tmp = tempdir()?;
    let db_path = tmp.path().join("payments.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    println!("🚀 Starting server on port {port}...");
    println!("   Database: {db_url}");

    let repo = build_repo(&db_url).await?;

    // Deterministic providers so the demo output is stable
    let registry = ProviderRegistry::new(simulated_providers(&ProviderSettings {
        stripe: SimulatedBehavior::AlwaysApprove,
        paypal: SimulatedBehavior::AlwaysDecline,
        ..Default::default()
    }))?;

    let bus = EventBus::new();
    bus.subscribe_all(Arc::new(AuditLogListener));

    let service = Arc::new(PaymentService::new(repo, registry, bus));
    let router = HttpServer::new(service).router();

    let server_addr = format!("127.0.0.1:{port}");
    let server_listener = TcpListener::bind(&server_addr).await?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(
            server_listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        {
            eprintln!("server error: {e}");
        }
    });

    let client = PaymentsClient::new(format!("http://127.0.0.1:{port}"));

    // ─────────────────────────────────────────────────────────────────────────
    // Demo: payment flows
    // ─────────────────────────────────────────────────────────────────────────

    let health = client.health().await?;
    println!("✅ Server health: {health}");

    let providers = client.list_providers().await?;
    println!("✅ Providers: {}", providers.join(", "));

    let approved = client
        .create_payment(&request("Stripe", Decimal::new(10050, 2)))
        .await?;
    println!(
        "✅ Stripe payment {} -> {:?} (ref={})",
        approved.id,
        approved.status,
        approved.provider_reference.as_deref().unwrap_or("-")
    );

    let declined = client
        .create_payment(&request("Paypal", Decimal::new(4200, 2)))
        .await?;
    println!(
        "✅ Paypal payment {} -> {:?} ({})",
        declined.id,
        declined.status,
        declined.failure_reason.as_deref().unwrap_or("-")
    );

    match client
        .create_payment(&request("Unknown", Decimal::ONE))
        .await
    {
        Ok(p) => println!("❌ Unexpected success: {}", p.id),
        Err(e) => println!(
            "✅ Unknown provider rejected: {}",
            e.reason().unwrap_or("no reason")
        ),
    }

    match client.create_payment(&request("Stripe", Decimal::ZERO)).await {
        Ok(p) => println!("❌ Unexpected success: {}", p.id),
        Err(e) => println!(
            "✅ Zero amount rejected: {}",
            e.reason().unwrap_or("no reason")
        ),
    }

    let fetched = client.get_payment(approved.id).await?;
    println!(
        "✅ Read back {} -> {:?} (unchanged: {})",
        fetched.id,
        fetched.status,
        fetched.updated_at == approved.updated_at
    );

    println!("\n🎉 Demo complete!");
    Ok(())
}

fn request(provider: &str, amount: Decimal) -> CreatePaymentRequest {
    CreatePaymentRequest {
        amount,
        currency: "BRL".to_string(),
        method: "CREDIT_CARD".to_string(),
        provider: provider.to_string(),
    }
}
