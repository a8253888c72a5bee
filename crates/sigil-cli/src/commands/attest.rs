//! `sigil attest`: Record an attestation for a DID.

use clap::Args;
use sigil_core::AttestationType;

use super::parse_did;
use crate::context::CliContext;

#[derive(Args, Debug)]
pub struct AttestArgs {
    /// Subject DID.
    pub did: String,

    /// Attestation type (AI_VERIFIED, SPID_VERIFIED, JURY_VERIFIED, SUSPENDED).
    #[arg(short = 't', long = "type")]
    pub attestation_type: AttestationType,

    /// JSON payload attached to the attestation.
    #[arg(short, long, default_value = "{}")]
    pub payload: String,

    /// Issuer key; repeat for threshold types.
    #[arg(short = 'k', long = "issuer-key", required = true)]
    pub issuer_keys: Vec<String>,
}

pub async fn run(ctx: &CliContext, args: &AttestArgs) -> anyhow::Result<()> {
    let payload: serde_json::Value = serde_json::from_str(&args.payload)
        .map_err(|e| anyhow::anyhow!("payload must be valid JSON: {}", e))?;
    let service = ctx.service()?;
    let did = parse_did(&args.did)?;

    let attestation = service
        .attest(&did, args.attestation_type, payload, &args.issuer_keys)
        .await?;
    let level = service.attestations().derive_level(&did).await?;

    println!("Attestation recorded");
    println!("  ID:       {}", attestation.id);
    println!("  Type:     {}", attestation.attestation_type);
    println!("  Level:    {}", level);
    Ok(())
}
