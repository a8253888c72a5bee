//! `sigil ledger`: Export a ledger as JSON.

use clap::Args;
use sigil_core::LedgerId;

use crate::context::CliContext;

#[derive(Args, Debug)]
pub struct LedgerArgs {
    /// Ledger id.
    pub id: String,
}

pub async fn run(ctx: &CliContext, args: &LedgerArgs) -> anyhow::Result<()> {
    let service = ctx.service()?;
    let blocks = service.read_ledger(&LedgerId::new(args.id.clone())).await?;
    println!("{}", serde_json::to_string_pretty(&blocks)?);
    Ok(())
}
