//! `sigil create`: Create a new identity ledger.

use clap::Args;

use super::read_key_arg;
use crate::context::CliContext;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Governing public key: PEM file path, inline PEM, hex, or base58.
    pub key: String,
}

pub async fn run(ctx: &CliContext, args: &CreateArgs) -> anyhow::Result<()> {
    let service = ctx.service()?;
    let key = read_key_arg(&args.key)?;
    let id = service.create_identity(&key).await?;
    let did = service.derive_did(&key)?;

    println!("Identity created");
    println!("  Ledger:   {}", id);
    println!("  DID:      {}", did);
    Ok(())
}
