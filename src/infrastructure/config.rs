//! Configuration file management.
//!
//! Handles loading the optional TOML configuration file.

use std::fs;
use std::path::Path;

use crate::domain::{AppConfig, AppError, Result};

/// Config filename looked up in the working directory when no explicit
/// path is given.
const CONFIG_FILE: &str = "whatsapp-export.toml";

/// Default configuration file content.
const DEFAULT_CONFIG: &str = r#"# whatsapp-export configuration
# All keys are optional; these are the defaults.

[output]
# Prefix for the per-export output directory
dir_prefix = "telegram-"

[media]
# Binary used to convert 3gpp videos to mp4
ffmpeg = "ffmpeg"

# Attachment download timeout in seconds
download_timeout_secs = 30

[authors]
# Persisted phone-number -> name cache
file = "members.json"
"#;

/// Load configuration from an explicit path, or from the working
/// directory, falling back to defaults when no file exists.
///
/// # Errors
/// Returns error if a named file is missing, or an existing file cannot
/// be read or parsed.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => load_config_from_file(path),
        None => {
            let default_path = Path::new(CONFIG_FILE);
            if default_path.exists() {
                load_config_from_file(default_path)
            } else {
                Ok(AppConfig::default())
            }
        }
    }
}

/// Load configuration from a specific file.
///
/// # Errors
/// Returns error if the file cannot be read or parsed.
pub fn load_config_from_file(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read config file: {}", path.display()), e))?;

    toml::from_str(&content).map_err(|e| AppError::Config {
        message: format!("Failed to parse config file: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_parses() {
        let config: AppConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.output.dir_prefix, "telegram-");
        assert_eq!(config.media.ffmpeg, "ffmpeg");
        assert_eq!(config.media.download_timeout_secs, 30);
        assert_eq!(config.authors.file, "members.json");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("whatsapp-export.toml");
        fs::write(&path, "[media]\nffmpeg = \"/opt/ffmpeg/bin/ffmpeg\"\n").unwrap();

        let config = load_config_from_file(&path).unwrap();
        assert_eq!(config.media.ffmpeg, "/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(config.output.dir_prefix, "telegram-");
    }

    #[test]
    fn test_named_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("nope.toml"))).is_err());
    }
}
