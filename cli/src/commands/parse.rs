use anyhow::{Context as _, Result};
use chainconf::{Context, Format, KEY_FORMAT, KEY_TEXT, preset_source_loader};
use clap::Args;
use std::io::Read;
use std::path::PathBuf;

use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct ParseArgs {
    #[arg(help = "File to parse; reads stdin when omitted")]
    pub file: Option<PathBuf>,

    #[arg(long, help = "Input format (toml, json, yaml, ini); detected from FILE when omitted")]
    pub format: Option<String>,

    #[arg(long, short, value_enum, default_value_t = OutputFormat::Json, help = "Output format")]
    pub output: OutputFormat
}

pub fn run(args: ParseArgs) -> Result<()> {
    let format = match (&args.format, &args.file) {
        (Some(format), _) => format.clone(),
        (None, Some(file)) => Format::from_path(file)?.name().to_string(),
        (None, None) => anyhow::bail!("--format is required when reading from stdin")
    };

    let text = match &args.file {
        Some(file) => std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            buffer
        }
    };

    let item = preset_source_loader().load(
        Context::new()
            .with(KEY_TEXT, text)
            .with(KEY_FORMAT, format)
    )?;

    println!("{}", output::render(&item, args.output)?);
    Ok(())
}
