use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use otp_relay::config::load_or_default;
use otp_relay::lifecycle::{build_services, Services};
use otp_relay::observability::init_tracing;
use otp_relay::summary::wei_to_ether;
use otp_relay::view::{render_text, BlockDetailsView};

#[derive(Parser)]
#[command(name = "otp-cli")]
#[command(about = "Drive the OTP contract and inspect the ledger without the HTTP relay", long_about = None)]
struct Cli {
    /// Relay configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show block height, accounts and the first account's balance
    Status,
    /// Generate an OTP, read one from stdin, validate it, then show the latest block
    Workflow,
    /// Show one block (latest by default)
    Block {
        #[arg(short, long)]
        number: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_or_default(cli.config.as_deref())?;
    init_tracing("warn");

    let services = build_services(&config).await?;

    match cli.command {
        Commands::Status => status(&services).await?,
        Commands::Workflow => workflow(&services).await?,
        Commands::Block { number } => block(&services, number).await?,
    }
    Ok(())
}

async fn status(services: &Services) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = &services.ledger;
    println!(
        "Contract: {} at {}",
        services.contract.name(),
        services.contract.address()
    );
    println!("Current Block Number: {}", ledger.block_number().await?);

    let accounts = ledger.accounts().await?;
    println!("Available Accounts:");
    for (index, account) in accounts.iter().enumerate() {
        println!("{}: {}", index, account);
    }

    if let Some(first) = accounts.first() {
        let balance = ledger.balance(*first).await?;
        println!("Balance of {}: {} ETH", first, wei_to_ether(balance));
    }
    Ok(())
}

async fn workflow(services: &Services) -> Result<(), Box<dyn std::error::Error>> {
    status(services).await?;

    let caller = services.ledger.default_account().await?;
    let otp = services.otp.issue_otp().await?;
    println!("Generated OTP for {}: {}", caller, otp);

    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(b"Please enter the OTP to validate: ")
        .await?;
    stdout.flush().await?;

    let mut input = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut input).await?;
    let candidate = input.trim();

    let is_valid = services.otp.check_otp(candidate).await?;
    println!(
        "Validation result for OTP \"{}\": {}",
        candidate,
        if is_valid { "Valid" } else { "Invalid" }
    );

    block(services, None).await
}

async fn block(services: &Services, number: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let summary = match number {
        Some(number) => services.summary.block(number).await?,
        None => services.summary.latest().await?,
    };
    println!();
    print!("{}", render_text(&BlockDetailsView::from_summary(&summary)));
    Ok(())
}
