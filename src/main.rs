//! Ripple SDK CLI Application
//!
//! A command-line interface for accounts, payments and node RPC.

use clap::{Parser, Subcommand};
use ripple_sdk::cli;
use ripple_sdk::rpc::{RpcClient, RpcConfig, DEFAULT_TIMEOUT_SECS};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "ripple")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "Accounts, payments and multisign for Ripple-style ledgers", long_about = None)]
struct Cli {
    /// Node JSON-RPC endpoint
    #[arg(long, global = true, default_value = "http://localhost:5005")]
    rpc_url: String,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Account operations
    Account {
        #[command(subcommand)]
        action: AccountCommands,
    },

    /// Transaction construction and signing
    Tx {
        #[command(subcommand)]
        action: TxCommands,
    },

    /// Node queries and submission
    Rpc {
        #[command(subcommand)]
        action: RpcCommands,
    },
}

#[derive(Subcommand)]
enum AccountCommands {
    /// Generate a new account
    New,

    /// Derive an account from its secret
    Import {
        /// Base58 family seed
        #[arg(short, long)]
        secret: String,
    },
}

#[derive(Subcommand)]
enum TxCommands {
    /// Print a single-sign payment descriptor
    PaymentJson {
        #[arg(short, long)]
        from: String,
        #[arg(short, long)]
        to: String,
        /// Drops, or value/currency/issuer
        #[arg(short, long)]
        amount: String,
    },

    /// Print a multisign payment descriptor
    MultisignJson {
        #[arg(short, long)]
        from: String,
        #[arg(short, long)]
        to: String,
        #[arg(short, long)]
        amount: String,
        #[arg(long)]
        fee: String,
        #[arg(long)]
        sequence: u32,
    },

    /// Build a raw payment
    Build {
        #[arg(short, long)]
        from: String,
        #[arg(short, long)]
        to: String,
        #[arg(short, long)]
        amount: String,
        #[arg(long)]
        fee: String,
        #[arg(long)]
        sequence: u32,
        /// Plain-text memo
        #[arg(long)]
        memo: Option<String>,
    },

    /// Single-sign a raw payment
    Sign {
        #[arg(short, long)]
        secret: String,
        #[arg(short, long)]
        raw: String,
    },

    /// Add a signer entry to a raw payment
    Multisign {
        #[arg(short, long)]
        secret: String,
        #[arg(short, long)]
        raw: String,
    },

    /// Verify a co-signer's signature
    CheckMultisign {
        #[arg(short, long)]
        raw: String,
        #[arg(long)]
        signer: String,
        /// Compressed public key, hex
        #[arg(long)]
        pubkey: String,
        /// DER signature, hex
        #[arg(long)]
        signature: String,
    },

    /// Merge co-signer copies of one payment
    Combine {
        /// Raw payments, one per co-signer
        #[arg(short, long, num_args = 1..)]
        raw: Vec<String>,
    },
}

#[derive(Subcommand)]
enum RpcCommands {
    /// Latest closed ledger index
    Height,

    /// Current fee levels
    Fee,

    /// Account balance and sequence
    AccountInfo {
        #[arg(short, long)]
        address: String,
    },

    /// Look up a transaction
    Tx {
        #[arg(long)]
        hash: String,
    },

    /// Submit a signed blob
    Submit {
        #[arg(short, long)]
        blob: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Account { action } => match action {
            AccountCommands::New => cli::cmd_account_new(),
            AccountCommands::Import { secret } => cli::cmd_account_import(&secret),
        },

        Commands::Tx { action } => match action {
            TxCommands::PaymentJson { from, to, amount } => {
                cli::cmd_tx_payment_json(&from, &to, &amount)
            }
            TxCommands::MultisignJson {
                from,
                to,
                amount,
                fee,
                sequence,
            } => cli::cmd_tx_multisign_json(&from, &to, &amount, &fee, sequence),
            TxCommands::Build {
                from,
                to,
                amount,
                fee,
                sequence,
                memo,
            } => cli::cmd_tx_build(&from, &to, &amount, &fee, sequence, memo.as_deref()),
            TxCommands::Sign { secret, raw } => cli::cmd_tx_sign(&secret, &raw),
            TxCommands::Multisign { secret, raw } => cli::cmd_tx_multisign(&secret, &raw),
            TxCommands::CheckMultisign {
                raw,
                signer,
                pubkey,
                signature,
            } => cli::cmd_tx_check_multisign(&raw, &signer, &pubkey, &signature),
            TxCommands::Combine { raw } => cli::cmd_tx_combine(&raw),
        },

        Commands::Rpc { action } => {
            let config = RpcConfig {
                url: cli.rpc_url,
                timeout: Duration::from_secs(cli.timeout_secs),
                ..Default::default()
            };
            run_rpc_command(action, config)
        }
    }
}

fn run_rpc_command(action: RpcCommands, config: RpcConfig) -> Result<(), Box<dyn std::error::Error>> {
    let client = RpcClient::new(config)?;
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        match action {
            RpcCommands::Height => cli::cmd_rpc_height(&client).await,
            RpcCommands::Fee => cli::cmd_rpc_fee(&client).await,
            RpcCommands::AccountInfo { address } => {
                cli::cmd_rpc_account_info(&client, &address).await
            }
            RpcCommands::Tx { hash } => cli::cmd_rpc_tx(&client, &hash).await,
            RpcCommands::Submit { blob } => cli::cmd_rpc_submit(&client, &blob).await,
        }
    })
}
