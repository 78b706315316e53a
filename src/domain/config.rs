//! Configuration models.
//!
//! Contains the typed representation of the optional TOML configuration
//! file, with serde defaults so a partial or absent file still yields a
//! usable configuration.

use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Output location settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Media download and transcoding settings.
    #[serde(default)]
    pub media: MediaConfig,

    /// Author directory settings.
    #[serde(default)]
    pub authors: AuthorConfig,
}

/// Output location settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Prefix for the per-export output directory.
    #[serde(default = "default_dir_prefix")]
    pub dir_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir_prefix: default_dir_prefix(),
        }
    }
}

fn default_dir_prefix() -> String {
    "telegram-".to_string()
}

/// Media download and transcoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Binary used to convert legacy video containers.
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: String,

    /// Timeout for attachment downloads in seconds.
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffmpeg: default_ffmpeg(),
            download_timeout_secs: default_download_timeout_secs(),
        }
    }
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

const fn default_download_timeout_secs() -> u64 {
    30
}

/// Author directory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorConfig {
    /// Path of the persisted identifier→name cache.
    #[serde(default = "default_directory_file")]
    pub file: String,
}

impl Default for AuthorConfig {
    fn default() -> Self {
        Self {
            file: default_directory_file(),
        }
    }
}

fn default_directory_file() -> String {
    "members.json".to_string()
}
