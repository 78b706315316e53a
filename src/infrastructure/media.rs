//! Media attachment resolution and storage.
//!
//! Resolves attachment descriptors to normalized on-disk filenames and
//! materializes the bytes exactly once: inline base64 payloads are
//! decoded, remote URLs are fetched with a blocking HTTP client, and a
//! file that already exists on disk is never re-fetched or rewritten.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::domain::{AppError, Attachment, MediaConfig, MediaPayload, Result};

/// Extension per recognized MMS content type. Non-standard encodings
/// normalize to a canonical extension (`jpeg` -> `jpg`).
const CONTENT_EXTENSIONS: &[(&str, &str)] = &[
    ("image/gif", "gif"),
    ("image/jpeg", "jpg"),
    ("image/jpg", "jpg"),
    ("image/png", "png"),
    ("video/3gpp", "3gpp"),
    ("video/mp4", "mp4"),
];

/// Stem used when an inline attachment carries no usable name.
const FALLBACK_STEM: &str = "media";

/// Writes media files for one export run.
pub struct MediaStore {
    dir: PathBuf,
    client: reqwest::blocking::Client,
    ffmpeg: String,
}

impl MediaStore {
    /// Creates a store writing into `dir`.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be constructed.
    pub fn new(dir: impl Into<PathBuf>, config: &MediaConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.download_timeout_secs))
            .build()
            .map_err(|e| AppError::Config {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            dir: dir.into(),
            client,
            ffmpeg: config.ffmpeg.clone(),
        })
    }

    /// Resolves an attachment to its on-disk filename, materializing the
    /// bytes if needed. Returns `None` for content types that are not
    /// recognized media (the caller treats the message as plain text).
    ///
    /// # Errors
    /// Returns error if the naming scheme cannot be parsed, the payload
    /// cannot be decoded, or fetching/writing fails.
    pub fn resolve(&self, attachment: &Attachment, timestamp_millis: i64) -> Result<Option<String>> {
        match (attachment.content_type.as_str(), &attachment.payload) {
            ("image", MediaPayload::Remote { url }) => {
                let filename = image_media_name(url_basename(url)?)?;
                self.download(url, &filename)?;
                Ok(Some(filename))
            }
            ("video", MediaPayload::Remote { url }) => {
                let filename = url_basename(url)?.to_string();
                self.download(url, &filename)?;
                Ok(Some(filename))
            }
            (ct, MediaPayload::Inline { data }) => {
                let Some(ext) = extension_for(ct) else {
                    return Ok(None);
                };

                let stem = attachment
                    .original_name
                    .as_deref()
                    .map_or(FALLBACK_STEM, name_stem);
                let filename = format!("{timestamp_millis}-{stem}.{ext}");

                if ct == "video/3gpp" {
                    // A prior run may have already converted and removed
                    // the original container.
                    let converted = mp4_name(&filename);
                    if self.dir.join(&converted).exists() {
                        return Ok(Some(converted));
                    }
                }

                self.write_inline(&filename, data)?;

                if ct == "video/3gpp" {
                    return Ok(Some(self.transcode_3gpp(&filename)));
                }

                Ok(Some(filename))
            }
            _ => Ok(None),
        }
    }

    /// Fetches a changed group avatar to `avatar.<ext>`.
    ///
    /// # Errors
    /// Returns error if the download fails.
    pub fn fetch_avatar(&self, url: &str) -> Result<String> {
        let filename = format!("avatar.{}", avatar_extension(url));
        self.download(url, &filename)?;
        Ok(filename)
    }

    fn download(&self, url: &str, filename: &str) -> Result<()> {
        let path = self.dir.join(filename);
        if path.exists() {
            tracing::debug!("media already present, skipping: {filename}");
            return Ok(());
        }

        let bytes = self
            .client
            .get(url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| AppError::download(url, e))?
            .bytes()
            .map_err(|e| AppError::download(url, e))?;

        fs::write(&path, &bytes).map_err(|e| AppError::io(format!("Failed to write {filename}"), e))
    }

    fn write_inline(&self, filename: &str, data: &str) -> Result<()> {
        let path = self.dir.join(filename);
        if path.exists() {
            tracing::debug!("media already present, skipping: {filename}");
            return Ok(());
        }

        let bytes = STANDARD
            .decode(data)
            .map_err(|e| AppError::invalid_data(format!("base64 payload: {e}")))?;

        fs::write(&path, &bytes).map_err(|e| AppError::io(format!("Failed to write {filename}"), e))
    }

    /// Converts a 3gpp container to mp4. Chat viewers recognize 3gpp as
    /// video but refuse to play it. Never fails: a missing or failing
    /// converter keeps the original file and filename.
    fn transcode_3gpp(&self, filename: &str) -> String {
        tracing::info!("3gpp video found, attempting conversion with {}", self.ffmpeg);

        let converted = mp4_name(filename);
        let output = Command::new(&self.ffmpeg)
            .arg("-i")
            .arg(filename)
            .arg(&converted)
            .current_dir(&self.dir)
            .output();

        match output {
            Ok(out) if out.status.success() => {
                if let Err(e) = fs::remove_file(self.dir.join(filename)) {
                    tracing::warn!("could not remove {filename} after conversion: {e}");
                }
                converted
            }
            Ok(_) => {
                tracing::info!("conversion failed, keeping {filename}");
                filename.to_string()
            }
            Err(_) => {
                tracing::info!("{} not available, keeping {filename}", self.ffmpeg);
                filename.to_string()
            }
        }
    }
}

/// Maps a recognized content type to its canonical extension.
fn extension_for(content_type: &str) -> Option<&'static str> {
    CONTENT_EXTENSIONS
        .iter()
        .find(|(ct, _)| *ct == content_type)
        .map(|(_, ext)| *ext)
}

/// Last path segment of a media URL.
fn url_basename(url: &str) -> Result<&str> {
    let basename = url.rsplit('/').next().unwrap_or_default();
    if basename.is_empty() {
        return Err(AppError::MediaName {
            name: url.to_string(),
        });
    }
    Ok(basename)
}

/// Reorders a GroupMe image segment into a usable filename.
///
/// Image media from GroupMe URLs is named oddly, like
/// `828x809.jpeg.b083fc7771d848d78c8466f558202063`; the id component goes
/// first and the extension is normalized, giving
/// `b083fc7771d848d78c8466f558202063.828x809.jpg`. Video media is named
/// fine and is not rewritten.
fn image_media_name(basename: &str) -> Result<String> {
    let parts: Vec<&str> = basename.split('.').collect();
    match parts.as_slice() {
        [resolution, ext, id] => {
            let ext = if *ext == "jpeg" { "jpg" } else { *ext };
            Ok(format!("{id}.{resolution}.{ext}"))
        }
        _ => Err(AppError::MediaName {
            name: basename.to_string(),
        }),
    }
}

/// Guesses the avatar image extension from its URL.
///
/// Known approximation carried over from the source behavior: the actual
/// content type is never verified, the URL is only substring-matched.
fn avatar_extension(url: &str) -> &'static str {
    if url.contains(".png.") {
        "png"
    } else {
        "jpg"
    }
}

/// Filename stem of an original attachment name.
fn name_stem(name: &str) -> &str {
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(FALLBACK_STEM)
}

/// Sibling mp4 filename for a transcoded container.
fn mp4_name(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map_or_else(|| format!("{filename}.mp4"), |(stem, _)| format!("{stem}.mp4"))
}
