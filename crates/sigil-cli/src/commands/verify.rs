//! `sigil verify`: Show the trust level and attestations of a DID.

use clap::Args;

use super::parse_did;
use crate::context::CliContext;

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Subject DID.
    pub did: String,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

pub async fn run(ctx: &CliContext, args: &VerifyArgs) -> anyhow::Result<()> {
    let service = ctx.service()?;
    let report = service.verify(&parse_did(&args.did)?).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Subject {}", report.did);
    println!("  Status:   {}", report.status);
    for att in &report.attestations {
        let marker = if att.revoked { " (revoked)" } else { "" };
        println!(
            "  - {} {} {}{}",
            att.id,
            att.attestation_type,
            att.issued_at.to_rfc3339(),
            marker
        );
    }
    Ok(())
}
