//! Wallet CLI
//!
//! Command-line interface for the wallet ledger and payments API.

use anyhow::Result;
use clap::{Parser, Subcommand};

use wallet_client::WalletClient;
use wallet_types::{BookingId, PaymentId, PaymentMethod, UserId};

#[derive(Parser)]
#[command(name = "wallet")]
#[command(author, version, about = "Wallet and payments API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the wallet API
    #[arg(long, env = "WALLET_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wallet and ledger operations
    Wallet {
        #[command(subcommand)]
        action: WalletCommands,
    },
    /// Payment operations
    Payment {
        #[command(subcommand)]
        action: PaymentCommands,
    },
    /// Post a gateway callback, as the provider would
    SimulateCallback {
        /// Gateway (gateway_a or gateway_b)
        #[arg(long)]
        provider: String,
        /// Reference returned by checkout
        #[arg(long)]
        external_id: String,
        /// Report the payment as declined
        #[arg(long)]
        declined: bool,
    },
    /// Check API health
    Health,
}

#[derive(Subcommand)]
enum WalletCommands {
    /// Get (or create) a user's wallet
    Get {
        /// User ID (UUID)
        user: String,
    },
    /// Show a user's balance
    Balance {
        /// User ID (UUID)
        user: String,
    },
    /// Deposit funds into a wallet
    Deposit {
        #[arg(long)]
        user: String,
        #[arg(long)]
        amount: i64,
        #[arg(long)]
        description: Option<String>,
    },
    /// Withdraw funds from a wallet
    Withdraw {
        #[arg(long)]
        user: String,
        #[arg(long)]
        amount: i64,
        #[arg(long)]
        description: Option<String>,
    },
    /// List ledger entries, newest first
    History {
        #[arg(long)]
        user: String,
        #[arg(long, default_value = "20")]
        limit: i64,
        #[arg(long, default_value = "0")]
        offset: i64,
    },
}

#[derive(Subcommand)]
enum PaymentCommands {
    /// Create a payment
    Create {
        #[arg(long)]
        user: String,
        #[arg(long)]
        amount: i64,
        /// wallet, gateway_a or gateway_b
        #[arg(long, default_value = "wallet")]
        method: String,
        #[arg(long)]
        booking: Option<String>,
    },
    /// Get payment details
    Get {
        /// Payment ID (UUID)
        id: String,
    },
    /// List a user's payments
    List {
        #[arg(long)]
        user: String,
        #[arg(long, default_value = "20")]
        limit: i64,
        #[arg(long, default_value = "0")]
        offset: i64,
    },
    /// Start gateway checkout for a pending payment
    Checkout {
        /// Payment ID (UUID)
        id: String,
    },
    /// Refund a completed payment
    Refund {
        /// Payment ID (UUID)
        id: String,
    },
}

fn parse_user_id(s: &str) -> Result<UserId> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("Invalid user ID: {}", s))
}

fn parse_payment_id(s: &str) -> Result<PaymentId> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("Invalid payment ID: {}", s))
}

fn parse_booking_id(s: &str) -> Result<BookingId> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("Invalid booking ID: {}", s))
}

fn parse_method(s: &str) -> Result<PaymentMethod> {
    s.to_lowercase().parse().map_err(|_| {
        anyhow::anyhow!(
            "Unknown payment method: {}. Supported: wallet, gateway_a, gateway_b",
            s
        )
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = WalletClient::new(&cli.api_url);

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

        Commands::Wallet { action } => match action {
            WalletCommands::Get { user } => {
                let wallet = client.get_wallet(parse_user_id(&user)?).await?;
                println!("{}", serde_json::to_string_pretty(&wallet)?);
            }
            WalletCommands::Balance { user } => {
                let balance = client.get_balance(parse_user_id(&user)?).await?;
                println!("{}", balance);
            }
            WalletCommands::Deposit {
                user,
                amount,
                description,
            } => {
                let tx = client
                    .deposit(parse_user_id(&user)?, amount, description)
                    .await?;
                println!("{}", serde_json::to_string_pretty(&tx)?);
            }
            WalletCommands::Withdraw {
                user,
                amount,
                description,
            } => {
                let tx = client
                    .withdraw(parse_user_id(&user)?, amount, description)
                    .await?;
                println!("{}", serde_json::to_string_pretty(&tx)?);
            }
            WalletCommands::History {
                user,
                limit,
                offset,
            } => {
                let history = client
                    .list_transactions(parse_user_id(&user)?, limit, offset)
                    .await?;
                println!("{}", serde_json::to_string_pretty(&history)?);
            }
        },

        Commands::Payment { action } => match action {
            PaymentCommands::Create {
                user,
                amount,
                method,
                booking,
            } => {
                let booking_id = booking.as_deref().map(parse_booking_id).transpose()?;
                let payment = client
                    .create_payment(parse_user_id(&user)?, amount, parse_method(&method)?, booking_id)
                    .await?;
                println!("{}", serde_json::to_string_pretty(&payment)?);
            }
            PaymentCommands::Get { id } => {
                let payment = client.get_payment(parse_payment_id(&id)?).await?;
                println!("{}", serde_json::to_string_pretty(&payment)?);
            }
            PaymentCommands::List {
                user,
                limit,
                offset,
            } => {
                let payments = client
                    .list_payments(parse_user_id(&user)?, limit, offset)
                    .await?;
                println!("{}", serde_json::to_string_pretty(&payments)?);
            }
            PaymentCommands::Checkout { id } => {
                let checkout = client.checkout(parse_payment_id(&id)?).await?;
                println!("{}", serde_json::to_string_pretty(&checkout)?);
            }
            PaymentCommands::Refund { id } => {
                let payment = client.refund(parse_payment_id(&id)?).await?;
                println!("{}", serde_json::to_string_pretty(&payment)?);
            }
        },

        Commands::SimulateCallback {
            provider,
            external_id,
            declined,
        } => {
            let provider = parse_method(&provider)?;
            if !provider.is_external() {
                anyhow::bail!("Callbacks come from gateway_a or gateway_b, not {}", provider);
            }
            let ack = client
                .send_callback(provider, &external_id, !declined)
                .await?;
            println!("{}", serde_json::to_string_pretty(&ack)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_method() {
        assert_eq!(parse_method("GATEWAY_A").unwrap(), PaymentMethod::GatewayA);
        assert!(parse_method("paypal").is_err());
    }

    #[test]
    fn test_callback_flags() {
        let cli = Cli::try_parse_from([
            "wallet",
            "simulate-callback",
            "--provider",
            "gateway_b",
            "--external-id",
            "gb_abc",
            "--declined",
        ])
        .unwrap();
        match cli.command {
            Commands::SimulateCallback {
                provider,
                external_id,
                declined,
            } => {
                assert_eq!(provider, "gateway_b");
                assert_eq!(external_id, "gb_abc");
                assert!(declined);
            }
            _ => panic!("expected simulate-callback"),
        }
    }
}
