//! `sigil keygen`: Generate an Ed25519 key pair.

use std::path::PathBuf;

use clap::Args;
use sigil_crypto::{did_for_key, KeyPair};

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Write the private key (PKCS#8 PEM) here instead of printing it.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Also write the public key (SPKI PEM) to this file.
    #[arg(long)]
    pub public_out: Option<PathBuf>,
}

pub fn run(args: &KeygenArgs) -> anyhow::Result<()> {
    let keypair = KeyPair::generate();
    let public_pem = keypair.public_key().to_pem()?;
    let private_pem = keypair.to_pkcs8_pem()?;
    let did = did_for_key(&keypair.public_key())?;

    match &args.out {
        Some(path) => {
            std::fs::write(path, &private_pem)?;
            println!("Private key written to {}", path.display());
        }
        None => print!("{}", private_pem),
    }
    if let Some(path) = &args.public_out {
        std::fs::write(path, &public_pem)?;
        println!("Public key written to {}", path.display());
    }

    print!("{}", public_pem);
    println!("DID: {}", did);
    Ok(())
}
