//! `sigil prove`: Answer a pending challenge.

use clap::Args;

use super::parse_did;
use crate::context::CliContext;

#[derive(Args, Debug)]
pub struct ProveArgs {
    /// Subject DID.
    pub did: String,

    /// The issued nonce.
    #[arg(short, long)]
    pub nonce: String,

    /// Signature over the nonce (base64 or hex).
    #[arg(short, long)]
    pub signature: String,
}

pub async fn run(ctx: &CliContext, args: &ProveArgs) -> anyhow::Result<()> {
    let service = ctx.service()?;
    service
        .prove_challenge(&parse_did(&args.did)?, &args.nonce, &args.signature)
        .await?;
    println!("Challenge proven for {}", args.did);
    Ok(())
}
