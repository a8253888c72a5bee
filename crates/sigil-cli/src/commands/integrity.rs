//! `sigil integrity`: Check a ledger head against its anchor.

use clap::Args;
use sigil_core::LedgerId;

use crate::context::CliContext;

#[derive(Args, Debug)]
pub struct IntegrityArgs {
    /// Ledger id.
    pub id: String,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

pub async fn run(ctx: &CliContext, args: &IntegrityArgs) -> anyhow::Result<()> {
    let service = ctx.service()?;
    let report = service.check_integrity(&LedgerId::new(args.id.clone())).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Integrity report for {}", args.id);
        println!("  Valid:    {}", report.valid);
        println!("  Status:   {}", report.status);
        println!("  Level:    {}", report.verification_level);
        println!("  Blocks:   {}", report.block_count);
    }
    if !report.valid {
        anyhow::bail!("ledger {} diverges from its anchor", args.id);
    }
    Ok(())
}
