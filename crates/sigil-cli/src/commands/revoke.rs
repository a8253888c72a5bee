//! `sigil revoke`: Revoke an attestation.

use clap::Args;

use super::parse_did;
use crate::context::CliContext;

#[derive(Args, Debug)]
pub struct RevokeArgs {
    /// Subject DID.
    pub did: String,

    /// Attestation id.
    pub attestation_id: String,

    /// Issuer key; repeat for threshold types.
    #[arg(short = 'k', long = "issuer-key", required = true)]
    pub issuer_keys: Vec<String>,
}

pub async fn run(ctx: &CliContext, args: &RevokeArgs) -> anyhow::Result<()> {
    let service = ctx.service()?;
    let did = parse_did(&args.did)?;
    let attestation = service
        .revoke_attestation(&did, &args.attestation_id, &args.issuer_keys)
        .await?;
    println!(
        "Attestation {} ({}) revoked",
        attestation.id, attestation.attestation_type
    );
    Ok(())
}
