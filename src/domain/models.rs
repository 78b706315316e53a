//! Domain models for chat export records.
//!
//! These models represent the core entities shared by both source formats
//! (GroupMe JSON export, SMS/MMS XML backup).

use chrono::{FixedOffset, Local, Offset};
use serde::Serialize;

use crate::domain::Result;

/// Where an attachment's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaPayload {
    /// Bytes must be fetched from a remote URL.
    Remote { url: String },
    /// Bytes are embedded in the record as base64.
    Inline { data: String },
}

/// A media reference embedded in a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Content tag: `image`/`video` for GroupMe, a MIME type for MMS.
    pub content_type: String,
    /// Remote or inline payload.
    pub payload: MediaPayload,
    /// Original filename, if the source carried one.
    pub original_name: Option<String>,
}

/// How a message identifies its author.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender<'a> {
    /// The record carries the display name inline (GroupMe).
    Display(&'a str),
    /// The record carries an identifier that needs directory lookup (MMS).
    Id(&'a str),
}

/// A system/metadata event carried by a message instead of chat content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemEvent {
    /// The group was renamed; the new name replaces the session group name.
    GroupRename { new_name: String },
    /// The group avatar changed; the new image is fetched as a side effect.
    AvatarChange { url: String },
    /// Any other system event. Suppressed with no side effect.
    Other,
}

/// The capability set shared by all source format variants.
///
/// The exporter and formatter operate only against this trait, never
/// against format-specific fields.
pub trait ChatMessage {
    /// Event time as epoch milliseconds.
    fn timestamp_millis(&self) -> i64;

    /// The author reference, or `None` when the record has no sender.
    fn sender(&self) -> Option<Sender<'_>>;

    /// Plaintext body. May be empty.
    fn body(&self) -> &str;

    /// Ordered attachment descriptors.
    fn attachments(&self) -> &[Attachment];

    /// `Some` when this record is a system/metadata event.
    fn system_event(&self) -> Option<SystemEvent>;

    /// Canonical participant-set key, for formats that interleave
    /// multiple conversations in one source file.
    fn participants(&self) -> Option<&str> {
        None
    }
}

/// Session-scoped state threaded through one export run.
///
/// Replaces ambient globals: the group name may be rewritten mid-run by a
/// rename event, and the offset pins timestamp rendering (tests use UTC).
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Current group/conversation display name.
    pub group_name: String,
    /// Fixed UTC offset used to render timestamps.
    pub tz: FixedOffset,
}

impl SessionContext {
    /// Create a session with an explicit offset.
    #[must_use]
    pub fn new(group_name: impl Into<String>, tz: FixedOffset) -> Self {
        Self {
            group_name: group_name.into(),
            tz,
        }
    }

    /// Create a session rendering in the machine's local offset.
    #[must_use]
    pub fn with_local_offset(group_name: impl Into<String>) -> Self {
        Self::new(group_name, Local::now().offset().fix())
    }
}

/// Summary statistics for one export run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportStats {
    /// Number of records read from the source file.
    pub messages_seen: usize,
    /// Transcript lines written.
    pub lines_written: usize,
    /// System/metadata events suppressed from the transcript.
    pub suppressed: usize,
    /// Messages dropped because their conversation was not selected.
    pub excluded: usize,
    /// Attachments resolved to media files.
    pub media_files: usize,
}

/// Resolves an unknown sender identifier to a display name.
///
/// The binary injects an interactive stdin prompt; tests inject a stub.
pub trait NameSource {
    /// Produce a display name for a normalized identifier.
    fn name_for(&mut self, identifier: &str) -> Result<String>;
}

/// Selects which participant sets to export when a source file interleaves
/// more than one conversation.
pub trait ConversationPicker {
    /// Given the distinct participant-set keys, return the subset to keep.
    fn pick(&mut self, group_name: &str, sets: &[String]) -> Result<Vec<String>>;
}
