use anyhow::{Context as _, Result, anyhow};
use chainconf::{
    Configurations, DEFAULT_CONFIGURATION_NAME, LoaderSettings, setup_registry
};
use clap::Args;
use std::path::PathBuf;
use tracing::debug;

use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct ShowArgs {
    #[arg(help = "Configuration name, resolved against files in --dir", default_value = DEFAULT_CONFIGURATION_NAME)]
    pub name: String,

    #[arg(long, short, env = "CHAINCONF_DIRECTORY", default_value = ".", help = "Directory holding configuration files")]
    pub dir: PathBuf,

    #[arg(long, env = "CHAINCONF_KEY_FILE", help = "Key file for encrypted configuration files")]
    pub key_file: Option<PathBuf>,

    #[arg(long, short, value_enum, default_value_t = OutputFormat::Json, help = "Output format")]
    pub format: OutputFormat,

    #[arg(long, help = "Print only the value at a dotted path (e.g. app.name)")]
    pub get: Option<String>
}

pub fn run(args: ShowArgs) -> Result<()> {
    let settings = LoaderSettings {
        directory: args.dir.display().to_string(),
        key_file: args.key_file.as_ref().map(|p| p.display().to_string()),
        ..LoaderSettings::default()
    }
    .validated()?;

    let registry = Configurations::new();
    setup_registry(&registry, &settings)?;
    let item = registry.get_config(&args.name, true)?;
    debug!(name = %args.name, entries = item.len(), "configuration loaded");

    let rendered = match &args.get {
        Some(path) => {
            let value = item
                .get_path(path)
                .ok_or_else(|| anyhow!("key path '{}' not found in '{}'", path, args.name))?;
            output::render_value(value, args.format)
        }
        None => output::render(&item, args.format)
    }
    .with_context(|| format!("Failed to render '{}'", args.name))?;

    println!("{rendered}");
    Ok(())
}
