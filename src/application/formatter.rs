//! Per-message transcript formatting.
//!
//! Renders one WhatsApp-style line per visible message and applies the
//! side effects of suppressed system events.

use chrono::{DateTime, FixedOffset};
use colored::Colorize;

use crate::domain::{AppError, ChatMessage, ExportStats, Result, SessionContext, SystemEvent};
use crate::infrastructure::MediaStore;

/// Suffix appended to each resolved attachment filename in the transcript.
const FILE_ATTACHED: &str = "(file attached)";

/// Renders a message timestamp as WhatsApp writes it: non-padded month,
/// two-digit year, zero-padded day, hour and minute.
///
/// # Errors
/// Returns error if the timestamp is outside the representable range.
pub fn format_timestamp(timestamp_millis: i64, tz: FixedOffset) -> Result<String> {
    let dt = DateTime::from_timestamp_millis(timestamp_millis)
        .ok_or_else(|| AppError::invalid_data(format!("timestamp {timestamp_millis} out of range")))?
        .with_timezone(&tz);

    Ok(dt.format("%-m/%d/%y, %H:%M").to_string())
}

/// Builds the transcript line for a resolved attachment filename.
#[must_use]
pub fn media_line(filename: &str) -> String {
    format!("{filename} {FILE_ATTACHED}")
}

/// Formats one message as a transcript line.
///
/// Attachment lines precede the text body, oldest attachment first.
/// System/metadata events render nothing; their side effects are applied
/// separately by [`apply_system_event`].
///
/// # Errors
/// Returns error if the timestamp cannot be rendered.
pub fn format_message<M: ChatMessage>(
    message: &M,
    author: &str,
    media_lines: &[String],
    tz: FixedOffset,
) -> Result<Option<String>> {
    if message.system_event().is_some() {
        return Ok(None);
    }

    let stamp = format_timestamp(message.timestamp_millis(), tz)?;

    let mut text = media_lines.join("\n");
    let body = message.body();
    if !body.is_empty() {
        if text.is_empty() {
            text.push_str(body);
        } else {
            text.push('\n');
            text.push_str(body);
        }
    }

    Ok(Some(format!("{stamp} - {author}: {text}")))
}

/// Applies the side effects of a suppressed system event: a rename
/// rewrites the session group name, an avatar change fetches the new
/// image.
///
/// # Errors
/// Returns error if the avatar download fails.
pub fn apply_system_event(
    event: &SystemEvent,
    session: &mut SessionContext,
    media: &MediaStore,
) -> Result<()> {
    match event {
        SystemEvent::GroupRename { new_name } => {
            tracing::debug!(from = %session.group_name, to = %new_name, "group renamed");
            session.group_name.clone_from(new_name);
        }
        SystemEvent::AvatarChange { url } => {
            let filename = media.fetch_avatar(url)?;
            tracing::debug!("avatar updated: {filename}");
        }
        SystemEvent::Other => {}
    }

    Ok(())
}

/// Formats export statistics for display.
#[must_use]
pub fn format_stats(stats: &ExportStats) -> String {
    format!(
        "{}\n  Messages read: {}\n  Lines written: {}\n  System events suppressed: {}\n  Excluded by selection: {}\n  Media files: {}",
        "📊 Export summary".bold(),
        stats.messages_seen.to_string().cyan(),
        stats.lines_written.to_string().green(),
        stats.suppressed.to_string().yellow(),
        stats.excluded.to_string().yellow(),
        stats.media_files.to_string().cyan(),
    )
}
