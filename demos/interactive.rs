//! Interactive CLI for the token engine
//!
//! Run with: cargo run --example interactive
//!
//! Requires ENGINE_RPC_URL, ENGINE_TOKEN_CONTRACT and ENGINE_PRIVATE_KEY
//! (see `NetworkConfig::from_env` for the optional settings)

use std::io::{self, Write};

use alloy::primitives::{TxHash, U256};
use eyre::Context;
use token_engine::{
    format_native, parse_native, EngineError, HttpNode, LocalSigner, NetworkConfig, NetworkEffect,
    TransactionSigner, TransferService,
};

type Service = TransferService<HttpNode>;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let private_key =
        std::env::var("ENGINE_PRIVATE_KEY").context("ENGINE_PRIVATE_KEY must be set")?;

    // Initialize service
    let config = NetworkConfig::from_env()?;
    let signer = LocalSigner::from_private_key(&private_key)?;
    let service = TransferService::connect(config).await?;

    println!("\n========================================");
    println!("       Token Engine Interactive CLI");
    println!("========================================");
    println!("Token contract:   {}", service.token().address());
    println!("Connected wallet: {}", signer.address());

    // Main loop
    loop {
        println!("\n----------------------------------------");
        println!("Select an option:");
        println!("  1. View info");
        println!("  2. Create account");
        println!("  3. Send native");
        println!("  4. Transfer tokens");
        println!("  5. Mint tokens");
        println!("  6. Burn tokens");
        println!("  7. Check transaction");
        println!("  q. Quit");
        println!("----------------------------------------");

        let choice = prompt("Enter choice: ")?;

        let result = match choice.as_str() {
            "1" => view_info(&service, &signer).await,
            "2" => create_account_flow(&service, &signer).await,
            "3" => send_native_flow(&service, &signer).await,
            "4" => transfer_token_flow(&service, &signer).await,
            "5" => mint_token_flow(&service, &signer).await,
            "6" => burn_token_flow(&service, &signer).await,
            "7" => check_transaction_flow(&service).await,
            "q" | "Q" => {
                println!("\nGoodbye!");
                break;
            }
            _ => {
                println!("\nInvalid choice. Please try again.");
                Ok(())
            }
        };

        if let Err(err) = result {
            report(&err);
            if let Some(engine) = err.downcast_ref::<EngineError>() {
                if engine.needs_resync() {
                    service.nonces().resync(signer.address()).await;
                }
            }
        }
    }

    Ok(())
}

/// Read one trimmed line from stdin
fn prompt(label: &str) -> eyre::Result<String> {
    print!("{label}");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn prompt_amount(label: &str) -> eyre::Result<U256> {
    let raw = prompt(label)?;
    raw.parse::<U256>()
        .with_context(|| format!("not a whole token amount: {raw}"))
}

fn confirm(label: &str) -> eyre::Result<bool> {
    Ok(matches!(prompt(label)?.as_str(), "y" | "Y" | "yes"))
}

/// Explain what a failure left behind on chain
fn report(err: &eyre::Report) {
    println!("\nError: {err:#}");

    let Some(engine) = err.downcast_ref::<EngineError>() else {
        return;
    };
    match engine.network_effect() {
        NetworkEffect::None => println!("Nothing was changed on chain."),
        NetworkEffect::Reverted => println!("Transaction was mined but reverted (fee paid)."),
        NetworkEffect::Unknown => {
            println!("Outcome unknown: the transaction may still be mined.");
        }
    }
    if let Some(tx) = engine.tx_context() {
        println!("Transaction: {tx}");
    }
    if let Some(consumed) = engine.consumed_nonce().filter(|_| engine.needs_resync()) {
        println!(
            "Nonce {} of {} never reached the node; resyncing the local counter.",
            consumed.nonce, consumed.from
        );
    }
}

/// Balances and token metadata
async fn view_info(service: &Service, signer: &LocalSigner) -> eyre::Result<()> {
    println!("\n=== Account Info ===");
    let address = signer.address().to_string();

    // Fetch all data in parallel
    let (native, tokens, info) = tokio::join!(
        service.get_native_balance(&address),
        service.get_token_balance(&address),
        service.get_token_info()
    );

    println!("Native balance: {}", format_native(native?));
    println!("Token balance:  {}", tokens?);

    let info = info?;
    println!("\n--- Token ---");
    println!("{}", serde_json::to_string_pretty(&info)?);

    Ok(())
}

async fn create_account_flow(service: &Service, signer: &LocalSigner) -> eyre::Result<()> {
    println!("\n=== CREATE ACCOUNT ===");

    let raw = prompt("Gas allowance to send from this wallet (native units, 0 for none): ")?;
    let allowance = parse_native(if raw.is_empty() { "0" } else { &raw })?;

    let (account, funding) = service.open_account(signer, allowance).await?;
    println!("Address:     {}", account.address);
    println!("Private key: {}", account.private_key_hex());
    println!("Store the private key now; it is not kept anywhere else.");
    if let Some(hash) = funding {
        println!("Funded in:   {hash}");
    }

    Ok(())
}

async fn send_native_flow(service: &Service, signer: &LocalSigner) -> eyre::Result<()> {
    println!("\n=== SEND NATIVE ===");

    let to = prompt("Recipient: ")?;
    let amount = parse_native(&prompt("Amount (native units): ")?)?;
    let wait = confirm("Wait for confirmation? [y/N]: ")?;

    println!("Sending {} to {to}...", format_native(amount));
    let hash = service.transfer_native(signer, &to, amount, wait).await?;
    println!("Transaction: {hash}");

    Ok(())
}

async fn transfer_token_flow(service: &Service, signer: &LocalSigner) -> eyre::Result<()> {
    println!("\n=== TRANSFER TOKENS ===");

    let to = prompt("Recipient: ")?;
    let amount = prompt_amount("Amount: ")?;
    let wait = confirm("Wait for confirmation? [y/N]: ")?;

    let hash = service.transfer_token(signer, &to, amount, wait).await?;
    println!("Transaction: {hash}");

    Ok(())
}

async fn mint_token_flow(service: &Service, signer: &LocalSigner) -> eyre::Result<()> {
    println!("\n=== MINT TOKENS ===");

    let to = prompt("Recipient: ")?;
    let amount = prompt_amount("Amount: ")?;

    let hash = service.mint_token(signer, &to, amount, true).await?;
    println!("Minted {amount} in {hash}");

    Ok(())
}

async fn burn_token_flow(service: &Service, signer: &LocalSigner) -> eyre::Result<()> {
    println!("\n=== BURN TOKENS ===");

    let amount = prompt_amount("Amount: ")?;

    let hash = service.burn_token(signer, amount, true).await?;
    println!("Burned {amount} in {hash}");

    Ok(())
}

async fn check_transaction_flow(service: &Service) -> eyre::Result<()> {
    println!("\n=== CHECK TRANSACTION ===");

    let hash = prompt("Transaction hash: ")?
        .parse::<TxHash>()
        .context("not a transaction hash")?;

    match service.transaction_status(hash).await? {
        Some(receipt) => println!("{}", serde_json::to_string_pretty(&receipt)?),
        None => println!("Not mined yet."),
    }

    Ok(())
}
