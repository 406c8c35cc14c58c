//! Payments CLI
//!
//! Command-line interface for the Payments API.

use anyhow::Result;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use payments_client::PaymentsClient;
use payments_types::{CreatePaymentRequest, PaymentId};

#[derive(Parser)]
#[command(name = "payments")]
#[command(author, version, about = "Payments API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the Payments API
    #[arg(
        long,
        env = "PAYMENTS_API_URL",
        default_value = "http://localhost:3000"
    )]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create and process a payment
    Pay {
        /// Amount in major units, e.g. 100.50
        #[arg(long)]
        amount: Decimal,
        /// Currency code (BRL, USD, EUR, GBP, INR)
        #[arg(long, default_value = "BRL")]
        currency: String,
        /// CREDIT_CARD, DEBIT_CARD or BANK_TRANSFER
        #[arg(long, default_value = "CREDIT_CARD")]
        method: String,
        /// Provider name, case-sensitive (e.g. Stripe, Paypal)
        #[arg(long)]
        provider: String,
    },
    /// Get payment details
    Get {
        /// Payment ID (UUID)
        id: String,
    },
    /// List registered providers
    Providers,
    /// Check API health
    Health,
    /// Start a local webhook sink that prints received events
    Listen {
        /// Port to listen on
        #[arg(long, default_value = "9000")]
        port: u16,
    },
}

fn parse_payment_id(s: &str) -> Result<PaymentId> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("Invalid payment ID: {}", s))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let client = PaymentsClient::new(&cli.api_url);

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Pay {
            amount,
            currency,
            method,
            provider,
        } => {
            let req = CreatePaymentRequest {
                amount,
                currency,
                method,
                provider,
            };
            let payment = client.create_payment(&req).await?;
            println!("{}", serde_json::to_string_pretty(&payment)?);
        }

        Commands::Get { id } => {
            let payment_id = parse_payment_id(&id)?;
            let payment = client.get_payment(payment_id).await?;
            println!("{}", serde_json::to_string_pretty(&payment)?);
        }

        Commands::Providers => {
            for name in client.list_providers().await? {
                println!("{}", name);
            }
        }

        Commands::Listen { port } => {
            let app = axum::Router::new().route("/webhook", axum::routing::post(handle_webhook));
            let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));
            println!("Listening for payment events on http://{}/webhook", addr);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

async fn handle_webhook(
    headers: axum::http::HeaderMap,
    body: String,
) -> impl axum::response::IntoResponse {
    let event = headers
        .get("X-Payment-Event")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");
    println!("POST /webhook ({})", event);

    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(json) => println!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or(body)
        ),
        Err(_) => println!("{}", body),
    }
    println!("----------------------------------------");
    axum::http::StatusCode::OK
}
