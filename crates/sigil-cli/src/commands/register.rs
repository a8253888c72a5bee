//! `sigil register`: Register a subject under its DID.

use clap::Args;

use super::read_key_arg;
use crate::context::CliContext;

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Public key: PEM file path, inline PEM, hex, or base58.
    pub key: String,
}

pub async fn run(ctx: &CliContext, args: &RegisterArgs) -> anyhow::Result<()> {
    let service = ctx.service()?;
    let subject = service.register_subject(&read_key_arg(&args.key)?).await?;
    println!("Subject registered");
    println!("  DID:      {}", subject.did);
    println!("  Created:  {}", subject.created_at.to_rfc3339());
    Ok(())
}
