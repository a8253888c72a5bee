//! `sigil audit`: Verify every block of a ledger.

use clap::Args;
use sigil_core::LedgerId;

use crate::context::CliContext;

#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Ledger id.
    pub id: String,
}

pub async fn run(ctx: &CliContext, args: &AuditArgs) -> anyhow::Result<()> {
    let service = ctx.service()?;
    let count = service.verify_chain(&LedgerId::new(args.id.clone())).await?;
    println!("Chain verified: {} blocks", count);
    Ok(())
}
