use anyhow::Result;
use chainconf::{ConfigValue, ConfigurationItem};
use clap::ValueEnum;
use colored::Colorize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    Toml
}

pub fn render(item: &ConfigurationItem, format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(item)?,
        OutputFormat::Yaml => serde_yaml::to_string(item)?,
        OutputFormat::Toml => toml::to_string_pretty(item)?
    };
    Ok(rendered.trim_end().to_string())
}

/// Scalars print bare; mappings render like a whole item.
pub fn render_value(value: &ConfigValue, format: OutputFormat) -> Result<String> {
    match value {
        ConfigValue::Map(item) => render(item, format),
        ConfigValue::String(s) => Ok(s.clone()),
        ConfigValue::Null => Ok("null".to_string()),
        other => Ok(other.to_json().to_string())
    }
}

pub fn hint(msg: &str) {
    eprintln!("{} {}", "hint:".cyan().bold(), msg.dimmed());
}

pub fn success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainconf::{Context, preset_source_loader};

    fn sample() -> ConfigurationItem {
        preset_source_loader()
            .load(
                Context::new()
                    .with("text", "name = \"demo\"\n[debug]\nlevel = \"warn\"")
                    .with("format", "toml")
            )
            .unwrap()
    }

    #[test]
    fn test_render_json() {
        let rendered = render(&sample(), OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["debug"]["level"], "warn");
    }

    #[test]
    fn test_render_yaml() {
        let rendered = render(&sample(), OutputFormat::Yaml).unwrap();
        assert!(rendered.contains("name: demo"));
    }

    #[test]
    fn test_render_toml() {
        let rendered = render(&sample(), OutputFormat::Toml).unwrap();
        assert!(rendered.contains("name = \"demo\""));
        assert!(rendered.contains("[debug]"));
    }

    #[test]
    fn test_render_scalar_value() {
        let item = sample();
        let value = item.get_path("debug.level").unwrap();
        assert_eq!(render_value(value, OutputFormat::Json).unwrap(), "warn");
    }

    #[test]
    fn test_hint_does_not_panic() {
        hint("This is a hint");
    }

    #[test]
    fn test_success_does_not_panic() {
        success("This is success");
    }
}
