//! `sigil did`: Derive the DID of a public key.

use clap::Args;

use super::read_key_arg;

#[derive(Args, Debug)]
pub struct DidArgs {
    /// Public key: PEM file path, inline PEM, hex, or base58.
    pub key: String,
}

pub fn run(args: &DidArgs) -> anyhow::Result<()> {
    let did = sigil_crypto::derive_did(&read_key_arg(&args.key)?)?;
    println!("{}", did);
    Ok(())
}
