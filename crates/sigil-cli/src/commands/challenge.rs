//! `sigil challenge`: Issue a challenge for a DID.

use clap::Args;

use super::parse_did;
use crate::context::CliContext;

#[derive(Args, Debug)]
pub struct ChallengeArgs {
    /// Subject DID.
    pub did: String,
}

pub async fn run(ctx: &CliContext, args: &ChallengeArgs) -> anyhow::Result<()> {
    let service = ctx.service()?;
    let grant = service.issue_challenge(&parse_did(&args.did)?).await?;
    println!("Challenge issued");
    println!("  Nonce:    {}", grant.nonce);
    println!("  Expires:  {}", grant.expiry.to_rfc3339());
    Ok(())
}
