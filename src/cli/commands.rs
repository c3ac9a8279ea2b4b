//! CLI commands for the SDK
//!
//! Implements the command handlers behind the `ripple` binary.

use crate::core::{
    generate_multisign_payment_tx_json, generate_payment, generate_payment_tx_json, AccountId,
    Amount, Memo, MultisignPayment, Payment,
};
use crate::multisig::{check_multisign, combine_signatures};
use crate::rpc::RpcClient;
use crate::wallet::Account;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

// =============================================================================
// Accounts
// =============================================================================

/// Generate a new account
pub fn cmd_account_new() -> CliResult<()> {
    let (account, wallet) = Account::generate()?;

    println!("🔐 New account created!");
    println!("   📍 Address: {}", wallet.address);
    println!("   🔑 Public Key: {}", account.public_key_hex());
    println!("   🗝️  Secret: {}", wallet.seed);
    println!("\n   ⚠️  IMPORTANT: Store the secret safely. It cannot be recovered.");

    Ok(())
}

/// Import an account from its secret
pub fn cmd_account_import(secret: &str) -> CliResult<()> {
    let account = Account::import(secret)?;

    println!("📥 Account imported");
    println!("   📍 Address: {}", account.address());
    println!("   🔑 Public Key: {}", account.public_key_hex());

    Ok(())
}

// =============================================================================
// Transactions
// =============================================================================

/// Print a single-sign payment descriptor
pub fn cmd_tx_payment_json(from: &str, to: &str, amount: &str) -> CliResult<()> {
    println!("{}", generate_payment_tx_json(from, to, amount)?);
    Ok(())
}

/// Print a multisign payment descriptor
pub fn cmd_tx_multisign_json(
    from: &str,
    to: &str,
    amount: &str,
    fee: &str,
    sequence: u32,
) -> CliResult<()> {
    println!(
        "{}",
        generate_multisign_payment_tx_json(from, to, amount, fee, sequence)?
    );
    Ok(())
}

/// Build a raw payment and print its hex
pub fn cmd_tx_build(
    from: &str,
    to: &str,
    amount: &str,
    fee: &str,
    sequence: u32,
    memo: Option<&str>,
) -> CliResult<()> {
    let from: AccountId = from.parse()?;
    let to: AccountId = to.parse()?;
    let amount: Amount = amount.parse()?;
    let fee: Amount = fee.parse()?;
    let memos = memo
        .map(|data| vec![Memo::new(b"text/plain", data.as_bytes())])
        .unwrap_or_default();

    let payment = generate_payment(from, to, amount, fee, sequence, memos);
    println!("{}", payment.to_hex()?);
    Ok(())
}

/// Single-sign a raw payment
pub fn cmd_tx_sign(secret: &str, raw: &str) -> CliResult<()> {
    let account = Account::import(secret)?;
    let (hash, blob) = account.sign_tx(raw)?;

    println!("✍️  Transaction signed by {}", account.address());
    println!("   🔗 Hash: {}", hash);
    println!("   📦 Blob: {}", blob);

    Ok(())
}

/// Append this account's signer entry to a raw payment
pub fn cmd_tx_multisign(secret: &str, raw: &str) -> CliResult<()> {
    let account = Account::import(secret)?;
    let payment = account.multi_sign_tx(raw)?;

    println!("✍️  Signer added by {}", account.address());
    println!("   👥 Signers: {}", payment.signers.len());
    if let Some(hash) = payment.hash_hex() {
        println!("   🔗 Hash: {}", hash);
    }
    println!("   📦 Blob: {}", payment.to_hex()?);

    let descriptor = MultisignPayment::from_payment(&payment)?;
    println!("   📄 JSON: {}", serde_json::to_string(&descriptor)?);

    Ok(())
}

/// Verify one co-signer's signature on a raw payment
pub fn cmd_tx_check_multisign(
    raw: &str,
    signer: &str,
    public_key: &str,
    signature: &str,
) -> CliResult<()> {
    let signer: AccountId = signer.parse()?;
    let public_key = hex::decode(public_key)?;
    let signature = hex::decode(signature)?;

    check_multisign(raw, &signer, &public_key, &signature)?;
    println!("✅ Signature from {} is valid", signer);

    Ok(())
}

/// Merge co-signer copies into one submittable payment
pub fn cmd_tx_combine(raws: &[String]) -> CliResult<()> {
    let payments = raws
        .iter()
        .map(|raw| Payment::from_hex(raw))
        .collect::<Result<Vec<_>, _>>()?;
    let combined = combine_signatures(&payments)?;

    println!("🧩 Combined {} signers", combined.signers.len());
    println!("   📦 Blob: {}", combined.to_hex()?);

    Ok(())
}

// =============================================================================
// RPC
// =============================================================================

/// Show the latest closed ledger index
pub async fn cmd_rpc_height(client: &RpcClient) -> CliResult<()> {
    let height = client.get_current_height().await?;
    println!("🧱 Closed ledger: {}", height);
    Ok(())
}

/// Show current fee levels
pub async fn cmd_rpc_fee(client: &RpcClient) -> CliResult<()> {
    let fee = client.get_fee().await?;

    println!("💸 Fees (drops)");
    println!("   ├─ Base: {}", fee.drops.base_fee);
    println!("   ├─ Minimum: {}", fee.drops.minimum_fee);
    println!("   ├─ Median: {}", fee.drops.median_fee);
    println!("   └─ Open ledger: {}", fee.drops.open_ledger_fee);

    Ok(())
}

/// Show an account's balance and sequence
pub async fn cmd_rpc_account_info(client: &RpcClient, address: &str) -> CliResult<()> {
    let account: AccountId = address.parse()?;
    let info = client.get_account_info(&account).await?;

    println!("💰 Account {}", info.account_data.account);
    println!("   ├─ Balance: {}", info.account_data.balance);
    println!("   ├─ Sequence: {}", info.account_data.sequence);
    println!("   └─ Owner count: {}", info.account_data.owner_count);

    Ok(())
}

/// Look up a transaction by hash
pub async fn cmd_rpc_tx(client: &RpcClient, hash: &str) -> CliResult<()> {
    let tx = client.get_tx(hash).await?;

    println!("🔎 Transaction {}", tx.hash);
    println!("   ├─ Validated: {}", tx.validated.unwrap_or(false));
    if let Some(ledger) = tx.ledger_index {
        println!("   ├─ Ledger: {}", ledger);
    }
    println!(
        "   └─ Result: {}",
        tx.transaction_result().unwrap_or("pending")
    );

    Ok(())
}

/// Submit a signed blob
pub async fn cmd_rpc_submit(client: &RpcClient, blob: &str) -> CliResult<()> {
    let result = client.submit(blob).await?;

    println!("📤 Submitted: {}", result.engine_result);
    println!("   {}", result.engine_result_message);
    if let Some(hash) = result.hash() {
        println!("   🔗 Hash: {}", hash);
    }

    Ok(())
}
