//! Sigil CLI: manage hash-chained identity ledgers, challenge-response and
//! attestations over a local store.
//!
//! Subcommands: init, keygen, did, register, create, sign, append,
//! integrity, audit, ledger, challenge, prove, attest, revoke, verify.

mod commands;
mod config;
mod context;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sigil_store::StoreBackend;
use tracing_subscriber::EnvFilter;

use config::SigilConfig;
use context::CliContext;

/// Sigil: verifiable identities on hash-chained ledgers.
#[derive(Parser, Debug)]
#[command(name = "sigil", version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, global = true, default_value = "sigil.toml")]
    config: PathBuf,

    /// Override the storage backend (sqlite, memory, rocksdb).
    #[arg(long, global = true)]
    backend: Option<StoreBackend>,

    /// Override the storage path.
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default configuration file.
    Init(commands::init::InitArgs),
    /// Generate an Ed25519 key pair.
    Keygen(commands::keygen::KeygenArgs),
    /// Derive the DID of a public key.
    Did(commands::did::DidArgs),
    /// Register a subject under its DID.
    Register(commands::register::RegisterArgs),
    /// Create a new identity ledger.
    Create(commands::create::CreateArgs),
    /// Sign a canonical payload or a challenge nonce.
    Sign(commands::sign::SignArgs),
    /// Append a signed event to a ledger.
    Append(commands::append::AppendArgs),
    /// Check a ledger head against its anchor.
    Integrity(commands::integrity::IntegrityArgs),
    /// Verify every block of a ledger.
    Audit(commands::audit::AuditArgs),
    /// Export a ledger as JSON.
    Ledger(commands::ledger::LedgerArgs),
    /// Issue a challenge for a DID.
    Challenge(commands::challenge::ChallengeArgs),
    /// Answer a pending challenge.
    Prove(commands::prove::ProveArgs),
    /// Record an attestation for a DID.
    Attest(commands::attest::AttestArgs),
    /// Revoke an attestation.
    Revoke(commands::revoke::RevokeArgs),
    /// Show the trust level and attestations of a DID.
    Verify(commands::verify::VerifyArgs),
}

fn init_tracing(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if format.eq_ignore_ascii_case("json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = SigilConfig::load(&cli.config)?;

    // Apply CLI overrides
    if let Some(backend) = cli.backend {
        config.storage.backend = backend;
    }
    if let Some(store) = cli.store {
        config.storage.path = store;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    init_tracing(&config.logging.level, &config.logging.format);
    tracing::debug!(
        config = %cli.config.display(),
        backend = %config.storage.backend,
        "configuration loaded"
    );

    let ctx = CliContext::new(config, cli.config);

    match &cli.command {
        Commands::Init(args) => commands::init::run(&ctx, args),
        Commands::Keygen(args) => commands::keygen::run(args),
        Commands::Did(args) => commands::did::run(args),
        Commands::Register(args) => commands::register::run(&ctx, args).await,
        Commands::Create(args) => commands::create::run(&ctx, args).await,
        Commands::Sign(args) => commands::sign::run(args),
        Commands::Append(args) => commands::append::run(&ctx, args).await,
        Commands::Integrity(args) => commands::integrity::run(&ctx, args).await,
        Commands::Audit(args) => commands::audit::run(&ctx, args).await,
        Commands::Ledger(args) => commands::ledger::run(&ctx, args).await,
        Commands::Challenge(args) => commands::challenge::run(&ctx, args).await,
        Commands::Prove(args) => commands::prove::run(&ctx, args).await,
        Commands::Attest(args) => commands::attest::run(&ctx, args).await,
        Commands::Revoke(args) => commands::revoke::run(&ctx, args).await,
        Commands::Verify(args) => commands::verify::run(&ctx, args).await,
    }
}
