use anyhow::Result;
use chainconf::{EncryptionKey, encrypt_file};
use clap::Args;
use std::path::PathBuf;

use crate::output;

#[derive(Args)]
pub struct EncryptArgs {
    #[arg(help = "Configuration file to encrypt")]
    pub file: PathBuf,

    #[arg(long, env = "CHAINCONF_KEY_FILE", help = "Key file produced by `chainconf keygen`")]
    pub key_file: PathBuf,

    #[arg(long, help = "Delete the plain file after encrypting")]
    pub remove_source: bool
}

pub fn run(args: EncryptArgs) -> Result<()> {
    let key = EncryptionKey::read_from(&args.key_file)?;
    let target = encrypt_file(&args.file, &key)?;

    if args.remove_source {
        std::fs::remove_file(&args.file)?;
    }

    output::success(&format!("Encrypted {} -> {}", args.file.display(), target.display()));
    Ok(())
}
