use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use crowdfund_client::{CampaignSnapshot, ClientError, CrowdfundClient, Session};
use crowdfund_program::CrowdfundProgram;
use ledger::{LedgerConfig, LedgerFile, PrivateKey, TransactionReceipt};
use ledger_core::{AccountId, Program};
use ledger_core::native_token::{lamports_to_sol, sol_to_lamports};
use log::debug;
use serde::{Deserialize, Serialize};

/// Crowdfund CLI - create campaigns, donate and withdraw on a local ledger
///
/// The ledger lives in a JSON file and every command that changes it writes
/// it back. Commands on the same file run one at a time. Amounts are decimal
/// SOL (1 SOL = 1_000_000_000 lamports, up to 9 decimal places).
///
/// Workflow:
///   1. crowdfund keygen
///   2. crowdfund airdrop 2
///   3. crowdfund create "Save Africa" --description "Wells and schools"
///   4. crowdfund donate <campaign> 0.2
///   5. crowdfund withdraw <campaign> 0.1
#[derive(Parser)]
#[command(name = "crowdfund", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Ledger state file
    #[arg(long, short = 'l', env = "CROWDFUND_LEDGER", default_value = "crowdfund-ledger.json")]
    ledger: PathBuf,

    /// Keypair file of the acting identity
    #[arg(long, short = 'k', env = "CROWDFUND_KEYPAIR", default_value = "crowdfund-keypair.json")]
    keypair: PathBuf,

    /// Ledger config (JSON); defaults apply when omitted
    #[arg(long, short = 'c', env = "CROWDFUND_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new keypair file
    Keygen {
        /// Overwrite an existing keypair file
        #[arg(long)]
        force: bool,
    },

    /// Print the account id of the keypair
    Address,

    /// Credit SOL from the local faucet
    Airdrop {
        /// Amount in SOL
        #[arg(value_name = "SOL", value_parser = sol_to_lamports)]
        amount: u64,

        /// Recipient (base58); defaults to the keypair's account
        #[arg(long)]
        to: Option<String>,
    },

    /// Show the balance of an account
    Balance {
        /// Account (base58); defaults to the keypair's account
        account: Option<String>,
    },

    /// Create a campaign owned by the keypair
    Create {
        /// Campaign name, 1 to 32 bytes; also its address label
        name: String,

        /// Free-form description, up to 256 bytes
        #[arg(long, short = 'd', default_value = "")]
        description: String,
    },

    /// Donate SOL to a campaign
    Donate {
        /// Campaign address (base58)
        campaign: String,

        /// Amount in SOL
        #[arg(value_name = "SOL", value_parser = sol_to_lamports)]
        amount: u64,
    },

    /// Withdraw SOL from your campaign
    Withdraw {
        /// Campaign address (base58)
        campaign: String,

        /// Amount in SOL
        #[arg(value_name = "SOL", value_parser = sol_to_lamports)]
        amount: u64,
    },

    /// Close your campaign and reclaim everything it holds
    Close {
        /// Campaign address (base58)
        campaign: String,
    },

    /// List all active campaigns
    List,

    /// Show one campaign
    Show {
        /// Campaign address (base58)
        campaign: String,
    },

    /// List the donations a campaign received
    Donations {
        /// Campaign address (base58)
        campaign: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn fail(context: &str, e: impl Display) -> ! {
    eprintln!("❌ {}: {}", context, e);
    std::process::exit(1);
}

fn fail_client(context: &str, e: ClientError) -> ! {
    match e.crowdfund_error() {
        Some(code) => fail(context, format!("{} (code {})", code, code.code())),
        None => fail(context, e),
    }
}

fn parse_account(s: &str) -> AccountId {
    s.parse()
        .unwrap_or_else(|e| fail(&format!("Invalid account id '{}'", s), e))
}

/// On-disk keypair: hex secret plus the derived account id for reference.
#[derive(Serialize, Deserialize)]
struct KeypairFile {
    account_id: AccountId,
    secret_key: String,
}

fn write_keypair(path: &Path, key: &PrivateKey) {
    let file = KeypairFile {
        account_id: ledger::account_id_from_key(key),
        secret_key: hex::encode(key.to_bytes()),
    };
    let json = serde_json::to_string_pretty(&file)
        .unwrap_or_else(|e| fail("Cannot encode keypair", e));
    std::fs::write(path, json)
        .unwrap_or_else(|e| fail(&format!("Cannot write keypair '{}'", path.display()), e));
}

fn load_session(path: &Path) -> Session {
    let json = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("❌ Cannot read keypair '{}': {}", path.display(), e);
        eprintln!("   Create one first:  crowdfund keygen");
        eprintln!("   Or set path:       --keypair <path> or CROWDFUND_KEYPAIR=<path>");
        std::process::exit(1);
    });
    let file: KeypairFile =
        serde_json::from_str(&json).unwrap_or_else(|e| fail("Malformed keypair file", e));
    let secret: [u8; 32] = hex::decode(&file.secret_key)
        .ok()
        .and_then(|bytes| bytes.try_into().ok())
        .unwrap_or_else(|| fail("Malformed keypair file", "secret_key must be 64 hex chars"));
    let session = Session::new(PrivateKey::from_bytes(&secret));
    if session.account_id() != file.account_id {
        fail("Malformed keypair file", "account_id does not match secret_key");
    }
    session
}

/// Lock and load the ledger file. The lock is held until the returned
/// handle drops at the end of `main`.
fn open_ledger(cli: &Cli) -> LedgerFile {
    let config = match &cli.config {
        Some(path) => LedgerConfig::from_file(path)
            .unwrap_or_else(|e| fail(&format!("Cannot load config '{}'", path.display()), e)),
        None => LedgerConfig::default(),
    };
    debug!("ledger config: {:?}", config);
    let program: Arc<dyn Program> = Arc::new(CrowdfundProgram::default());
    LedgerFile::open(config, &cli.ledger, [program])
        .unwrap_or_else(|e| fail(&format!("Cannot load ledger '{}'", cli.ledger.display()), e))
}

fn save_ledger(file: &LedgerFile) {
    file.save()
        .unwrap_or_else(|e| fail(&format!("Cannot save ledger '{}'", file.path().display()), e));
}

fn print_receipt(label: &str, receipt: &TransactionReceipt) {
    println!("📤 {} committed", label);
    println!("   signature: {}", receipt.signature);
    println!("   slot:      {}", receipt.slot);
    println!("   fee:       {} lamports", receipt.fee);
    for line in &receipt.logs {
        println!("   log: {}", line);
    }
}

fn print_campaign(snapshot: &CampaignSnapshot) {
    let c = &snapshot.campaign;
    println!("  Name:           {}", c.name);
    println!("  Address:        {}", snapshot.address);
    println!("  Owner:          {}", c.owner);
    if !c.description.is_empty() {
        println!("  Description:    {}", c.description);
    }
    println!("  Donated:        {} SOL", lamports_to_sol(c.amount_donated));
    println!("  Balance:        {} SOL", lamports_to_sol(snapshot.balance));
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    // Commands that don't touch the ledger
    match &cli.command {
        Commands::Completions { shell } => {
            generate(*shell, &mut Cli::command(), "crowdfund", &mut std::io::stdout());
            return;
        }
        Commands::Keygen { force } => {
            if cli.keypair.exists() && !force {
                fail(
                    "Refusing to overwrite",
                    format!("'{}' exists (use --force)", cli.keypair.display()),
                );
            }
            let key = PrivateKey::new_os_random();
            write_keypair(&cli.keypair, &key);
            println!("🔑 Keypair written to {}", cli.keypair.display());
            println!("   Account: {}", ledger::account_id_from_key(&key));
            return;
        }
        Commands::Address => {
            println!("{}", load_session(&cli.keypair).account_id());
            return;
        }
        _ => {}
    }

    let file = open_ledger(&cli);
    let ledger = Arc::clone(file.ledger());
    let client = CrowdfundClient::new(Arc::clone(&ledger));

    match &cli.command {
        // ── Airdrop ─────────────────────────────────────────────────────
        Commands::Airdrop { amount, to } => {
            let recipient = match to {
                Some(s) => parse_account(s),
                None => load_session(&cli.keypair).account_id(),
            };
            let balance = ledger
                .airdrop(recipient, *amount)
                .unwrap_or_else(|e| fail("Airdrop failed", e));
            save_ledger(&file);
            println!("💧 Airdropped {} SOL to {}", lamports_to_sol(*amount), recipient);
            println!("   Balance: {} SOL", lamports_to_sol(balance));
        }

        // ── Balance ─────────────────────────────────────────────────────
        Commands::Balance { account } => {
            let id = match account {
                Some(s) => parse_account(s),
                None => load_session(&cli.keypair).account_id(),
            };
            let lamports = client
                .balance(id)
                .await
                .unwrap_or_else(|e| fail_client("Balance lookup failed", e));
            println!("{} SOL ({} lamports)", lamports_to_sol(lamports), lamports);
        }

        // ── Create ──────────────────────────────────────────────────────
        Commands::Create { name, description } => {
            let session = load_session(&cli.keypair);
            println!("📝 Creating campaign '{}'", name);
            let (address, receipt) = client
                .create_campaign(&session, name, description)
                .await
                .unwrap_or_else(|e| fail_client("Create failed", e));
            save_ledger(&file);
            print_receipt(&format!("Create '{}'", name), &receipt);
            println!("\n✅ Campaign created at {}", address);
        }

        // ── Donate ──────────────────────────────────────────────────────
        Commands::Donate { campaign, amount } => {
            let session = load_session(&cli.keypair);
            let campaign = parse_account(campaign);
            let receipt = client
                .donate(&session, campaign, *amount)
                .await
                .unwrap_or_else(|e| fail_client("Donation failed", e));
            save_ledger(&file);
            print_receipt(&format!("Donate {} SOL", lamports_to_sol(*amount)), &receipt);
            println!("\n✅ Thank you!");
        }

        // ── Withdraw ────────────────────────────────────────────────────
        Commands::Withdraw { campaign, amount } => {
            let session = load_session(&cli.keypair);
            let campaign = parse_account(campaign);
            let receipt = client
                .withdraw(&session, campaign, *amount)
                .await
                .unwrap_or_else(|e| fail_client("Withdraw failed", e));
            save_ledger(&file);
            print_receipt(&format!("Withdraw {} SOL", lamports_to_sol(*amount)), &receipt);
            println!("\n✅ Withdrawn to {}", session.account_id());
        }

        // ── Close ───────────────────────────────────────────────────────
        Commands::Close { campaign } => {
            let session = load_session(&cli.keypair);
            let campaign = parse_account(campaign);
            let receipt = client
                .close_campaign(&session, campaign)
                .await
                .unwrap_or_else(|e| fail_client("Close failed", e));
            save_ledger(&file);
            print_receipt("Close campaign", &receipt);
            println!("\n✅ Campaign {} closed", campaign);
        }

        // ── List ────────────────────────────────────────────────────────
        Commands::List => {
            let campaigns = client
                .get_all_campaigns()
                .await
                .unwrap_or_else(|e| fail_client("Listing failed", e));
            println!("📦 {} active campaign(s)", campaigns.len());
            for snapshot in &campaigns {
                println!();
                print_campaign(snapshot);
            }
        }

        // ── Show ────────────────────────────────────────────────────────
        Commands::Show { campaign } => {
            let snapshot = client
                .get_campaign(parse_account(campaign))
                .await
                .unwrap_or_else(|e| fail_client("Lookup failed", e));
            print_campaign(&snapshot);
        }

        // ── Donations ───────────────────────────────────────────────────
        Commands::Donations { campaign } => {
            let donations = client
                .donations(parse_account(campaign))
                .await
                .unwrap_or_else(|e| fail_client("Lookup failed", e));
            println!("🎁 {} donation(s)", donations.len());
            for d in &donations {
                println!(
                    "  #{:<4} {} SOL from {} (slot {})",
                    d.sequence,
                    lamports_to_sol(d.amount),
                    d.donor,
                    d.slot
                );
            }
        }

        Commands::Completions { .. } | Commands::Keygen { .. } | Commands::Address => {
            unreachable!()
        }
    }
}
