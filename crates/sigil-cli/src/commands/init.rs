//! `sigil init`: Write a default configuration file.

use clap::Args;

use crate::config::SigilConfig;
use crate::context::CliContext;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file.
    #[arg(long)]
    pub force: bool,
}

pub fn run(ctx: &CliContext, args: &InitArgs) -> anyhow::Result<()> {
    if ctx.config_path.exists() && !args.force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            ctx.config_path.display()
        );
    }
    SigilConfig::default().save(&ctx.config_path)?;
    tracing::info!(path = %ctx.config_path.display(), "wrote default config");
    println!("Wrote {}", ctx.config_path.display());
    Ok(())
}
