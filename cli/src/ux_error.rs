use colored::Colorize;
use errors::ConfigError;

#[derive(Debug)]
pub struct UxError {
    pub what: String,
    pub why: Option<String>,
    pub how_to_fix: Vec<String>,
    pub suggested_command: Option<String>
}

impl UxError {
    pub fn new(what: impl Into<String>) -> Self {
        Self {
            what: what.into(),
            why: None,
            how_to_fix: Vec::new(),
            suggested_command: None
        }
    }

    pub fn why(mut self, reason: impl Into<String>) -> Self {
        self.why = Some(reason.into());
        self
    }

    pub fn fix(mut self, suggestion: impl Into<String>) -> Self {
        self.how_to_fix.push(suggestion.into());
        self
    }

    pub fn suggest(mut self, cmd: impl Into<String>) -> Self {
        self.suggested_command = Some(cmd.into());
        self
    }

    pub fn display(&self) {
        eprintln!();
        eprintln!("{} {}", "error:".red().bold(), self.what.white().bold());

        if let Some(why) = &self.why {
            eprintln!("       {}", why.dimmed());
        }

        if !self.how_to_fix.is_empty() {
            eprintln!();
            eprintln!("{}", "How to fix:".yellow().bold());
            for (i, fix) in self.how_to_fix.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, fix);
            }
        }

        if let Some(cmd) = &self.suggested_command {
            eprintln!();
            eprintln!("{}", "Try this:".green().bold());
            eprintln!("  $ {}", cmd.cyan());
        }
        eprintln!();
    }
}

impl std::fmt::Display for UxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.what)
    }
}

impl std::error::Error for UxError {}

/// Prints `err` to stderr, with remediation hints for configuration failures.
pub fn report(err: &anyhow::Error) {
    if let Some(config_error) = err.downcast_ref::<ConfigError>() {
        from_config_error(config_error).display();
        return;
    }

    let causes: Vec<String> = err.chain().skip(1).map(ToString::to_string).collect();
    let mut ux = UxError::new(err.to_string());
    if !causes.is_empty() {
        ux = ux.why(causes.join(": "));
    }
    ux.display();
}

pub fn from_config_error(err: &ConfigError) -> UxError {
    let ux = UxError::new(err.to_string());
    match err {
        ConfigError::SourceNotAccessible { path, .. } => ux
            .why(format!("Nothing readable at '{}'", path))
            .fix("Check the --dir argument and the file name")
            .fix("Files match a name by their stem: 'app' finds app.toml or app.yaml")
            .suggest("chainconf show config --dir ."),
        ConfigError::Decryption { .. } => ux
            .why("The file could not be decrypted with the given key")
            .fix("Make sure --key-file is the key the file was encrypted with")
            .fix("Re-encrypt the plain file with the current key")
            .suggest("chainconf encrypt config.toml --key-file config.key"),
        ConfigError::Parse { format, .. } => ux
            .why(format!("The content is not valid {}", format))
            .fix("Fix the syntax error reported above"),
        ConfigError::UnknownFormat { .. } => ux
            .why("Supported formats are toml, json, yaml (yml) and ini (cfg)")
            .fix("Rename the file with a supported extension or pass --format"),
        ConfigError::InvalidSettings { .. } => ux
            .why("CHAINCONF_* settings did not pass validation")
            .fix("Check CHAINCONF_DIRECTORY, CHAINCONF_KEY_FILE and CHAINCONF_LOG_LEVEL"),
        ConfigError::HandlerChainMisconfigured { .. } => ux
            .why("The loaded document is a bare value instead of a table")
            .fix("Top-level configuration must be a mapping or a list"),
        _ => ux
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ux_error_builder() {
        let err = UxError::new("Test error")
            .why("Because reasons")
            .fix("Do this")
            .fix("Or that")
            .suggest("chainconf show");

        assert_eq!(err.what, "Test error");
        assert_eq!(err.why, Some("Because reasons".to_string()));
        assert_eq!(err.how_to_fix.len(), 2);
        assert_eq!(err.suggested_command, Some("chainconf show".to_string()));
    }

    #[test]
    fn test_ux_error_display_trait() {
        let err = UxError::new("Display test");
        assert_eq!(format!("{}", err), "Display test");
    }

    #[test]
    fn test_from_config_error_not_accessible() {
        let err = from_config_error(&ConfigError::not_accessible("conf/config", "no file"));
        assert!(err.what.contains("conf/config"));
        assert!(err.why.unwrap().contains("conf/config"));
        assert!(err.suggested_command.is_some());
    }

    #[test]
    fn test_from_config_error_decryption() {
        let err = from_config_error(&ConfigError::Decryption {
            reason: "aead::Error".to_string()
        });
        assert_eq!(err.how_to_fix.len(), 2);
    }

    #[test]
    fn test_from_config_error_without_hints() {
        let err = from_config_error(&ConfigError::loader_not_found("default"));
        assert!(err.why.is_none());
        assert!(err.how_to_fix.is_empty());
    }

    #[test]
    fn test_report_does_not_panic() {
        report(&anyhow::anyhow!("plain failure"));
        report(&anyhow::Error::new(ConfigError::misconfigured("scalar")));
    }
}
