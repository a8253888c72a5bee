//! `sigil sign`: Sign a canonical ledger payload or a raw challenge nonce.

use clap::Args;
use sigil_core::SignablePayload;
use sigil_crypto::{random_nonce, sign, KeyPair};

use super::read_key_arg;

#[derive(Args, Debug)]
pub struct SignArgs {
    /// Private key: PKCS#8 PEM file path or inline PEM.
    #[arg(short, long)]
    pub key: String,

    /// Sign this text verbatim (e.g. a challenge nonce).
    #[arg(long, conflicts_with_all = ["id", "level", "ts", "nonce"])]
    pub raw: Option<String>,

    /// Ledger id the payload targets.
    #[arg(long, required_unless_present = "raw")]
    pub id: Option<String>,

    /// Verification level carried by the payload.
    #[arg(long, default_value_t = 0)]
    pub level: u32,

    /// Payload timestamp in unix milliseconds (default: now).
    #[arg(long)]
    pub ts: Option<i64>,

    /// Payload nonce (default: random).
    #[arg(long)]
    pub nonce: Option<String>,
}

pub fn run(args: &SignArgs) -> anyhow::Result<()> {
    let keypair = KeyPair::from_pkcs8_pem(&read_key_arg(&args.key)?)?;

    if let Some(raw) = &args.raw {
        println!("{}", sign(raw.as_bytes(), &keypair).to_base64());
        return Ok(());
    }

    let id = args
        .id
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("--id is required unless --raw is given"))?;
    let payload = SignablePayload::new(
        id,
        args.level,
        args.ts.unwrap_or_else(|| chrono::Utc::now().timestamp_millis()),
        args.nonce.clone().unwrap_or_else(random_nonce),
    );
    let message = payload.canonical_message();
    let signature = sign(message.as_bytes(), &keypair);

    println!("Message:    {}", message);
    println!("Level:      {}", payload.level);
    println!("Timestamp:  {}", payload.ts);
    println!("Nonce:      {}", payload.nonce);
    println!("Signature:  {}", signature.to_base64());
    Ok(())
}
