//! `visiongate config show|init`.

use std::path::Path;

use anyhow::{bail, Result};

use visiongate_config::{
    apply_all_defaults, load_and_prepare, redacted_config, write_config, ConfigValidationError,
    VisionGateConfig,
};

use crate::terminal_output::{note_info, note_success, note_warn};

/// Print preparation warnings for commands that don't run a logger.
pub fn note_config_warnings(warnings: &[ConfigValidationError]) {
    for warning in warnings {
        note_warn(&warning_line(warning));
    }
}

fn warning_line(warning: &ConfigValidationError) -> String {
    format!("Config warning at '{}': {}", warning.path, warning.message)
}

/// Print the effective config (file + env + defaults) with secrets masked.
pub async fn show(path: &Path) -> Result<()> {
    let prepared = load_and_prepare(path).await?;
    note_info(&format!("Config file: {}", path.display()));
    note_config_warnings(&prepared.warnings);
    println!("{}", serde_yaml::to_string(&redacted_config(&prepared.config))?);
    Ok(())
}

/// Write a defaults-populated config file.
pub async fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }
    let config = apply_all_defaults(VisionGateConfig::default());
    write_config(&config, path).await?;
    note_success(&format!("Wrote default config to {}", path.display()));
    Ok(())
}
