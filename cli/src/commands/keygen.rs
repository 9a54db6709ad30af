use anyhow::{Result, bail};
use chainconf::generate_key;
use clap::Args;
use std::path::PathBuf;

use crate::output;

#[derive(Args)]
pub struct KeygenArgs {
    #[arg(help = "Where to write the base64 key")]
    pub key_file: PathBuf,

    #[arg(long, help = "Overwrite an existing key file")]
    pub force: bool
}

pub fn run(args: KeygenArgs) -> Result<()> {
    if args.key_file.exists() && !args.force {
        bail!(
            "{} already exists; pass --force to replace it",
            args.key_file.display()
        );
    }

    generate_key(&args.key_file)?;
    output::success(&format!("Key written to {}", args.key_file.display()));
    output::hint("Keep the key file out of version control");
    Ok(())
}
