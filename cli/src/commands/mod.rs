pub mod encrypt;
pub mod keygen;
pub mod parse;
pub mod show;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "chainconf",
    author,
    version,
    about = "chainconf - configuration loading from handler chains",
    long_about = "Load configuration files the way an application would.\n\nFiles are resolved \
                  by bare name inside a directory, parsed from TOML, JSON, YAML or INI, and \
                  decrypted when a key file is given."
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "CHAINCONF_LOG_LEVEL",
        help = "Log level (trace, debug, info, warn, error); defaults to RUST_LOG"
    )]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Lazily load a configuration by name and print it")]
    Show(show::ShowArgs),

    #[command(about = "Parse configuration text from a file or stdin and print it")]
    Parse(parse::ParseArgs),

    #[command(about = "Generate a new encryption key file")]
    Keygen(keygen::KeygenArgs),

    #[command(about = "Encrypt a configuration file into FILE.fer")]
    Encrypt(encrypt::EncryptArgs)
}
