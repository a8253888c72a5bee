//! `sigil append`: Append a signed event to a ledger.

use clap::Args;
use sigil_core::{EventKind, LedgerId, SignablePayload};
use sigil_identity::SignedEvent;

use crate::context::CliContext;

#[derive(Args, Debug)]
pub struct AppendArgs {
    /// Ledger id.
    pub id: String,

    /// Event type (UPDATE_VERIFICATION, STATUS_SUSPENDED, STATUS_REVOKED).
    #[arg(short, long, default_value = "UPDATE_VERIFICATION")]
    pub event: EventKind,

    /// Signed verification level.
    #[arg(long)]
    pub level: u32,

    /// Signed timestamp (unix milliseconds).
    #[arg(long)]
    pub ts: i64,

    /// Signed nonce.
    #[arg(long)]
    pub nonce: String,

    /// Signature over the canonical message (base64 or hex).
    #[arg(short, long)]
    pub signature: String,

    /// Reason recorded with status changes.
    #[arg(long)]
    pub reason: Option<String>,
}

pub async fn run(ctx: &CliContext, args: &AppendArgs) -> anyhow::Result<()> {
    let service = ctx.service()?;
    let id = LedgerId::new(args.id.clone());
    let event = SignedEvent::from_kind(args.event, args.reason.clone())?;
    let payload = SignablePayload::new(args.id.clone(), args.level, args.ts, args.nonce.clone());

    let block = service
        .append_signed_event(&id, event, payload, &args.signature)
        .await?;

    println!("Block appended");
    println!("  Index:    {}", block.index);
    println!("  Event:    {}", block.kind());
    println!("  Hash:     {}", block.hash);
    Ok(())
}
