//! Conversation export orchestration.
//!
//! Drives the whole pipeline for one run: orders the records, partitions
//! interleaved conversations, resolves authors and media, formats each
//! message, and writes the transcript and the author directory.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::application::formatter::{self, media_line};
use crate::domain::{
    AppError, ChatMessage, ConversationPicker, ExportStats, NameSource, Result, Sender,
    SessionContext,
};
use crate::infrastructure::{AuthorDirectory, MediaStore};

/// Exports parsed records to a WhatsApp-style transcript in `out_dir`.
///
/// Media files are written inline, message by message, in iteration
/// order; the transcript and the author directory are written once after
/// all messages are processed, so the transcript name reflects any group
/// rename seen mid-run.
///
/// # Errors
/// Returns error on unresolvable senders, unparsable media names, failed
/// downloads, or IO failures.
pub fn export<M: ChatMessage>(
    mut records: Vec<M>,
    session: &mut SessionContext,
    media: &MediaStore,
    directory: &mut AuthorDirectory,
    names: &mut dyn NameSource,
    picker: &mut dyn ConversationPicker,
    out_dir: &Path,
) -> Result<ExportStats> {
    let mut stats = ExportStats {
        messages_seen: records.len(),
        ..ExportStats::default()
    };

    // Required chronological order; the GroupMe export stores newest-first.
    records.sort_by_key(ChatMessage::timestamp_millis);

    let allowed = select_conversations(&records, &session.group_name, picker)?;

    let mut lines = Vec::new();

    for record in &records {
        if let (Some(key), Some(allowed)) = (record.participants(), allowed.as_ref()) {
            if !allowed.iter().any(|a| a == key) {
                stats.excluded += 1;
                continue;
            }
        }

        if let Some(event) = record.system_event() {
            formatter::apply_system_event(&event, session, media)?;
            stats.suppressed += 1;
            continue;
        }

        let author = resolve_author(record, directory, names)?;

        let mut media_lines = Vec::new();
        for attachment in record.attachments() {
            if let Some(filename) = media.resolve(attachment, record.timestamp_millis())? {
                media_lines.push(media_line(&filename));
                stats.media_files += 1;
            }
        }

        if let Some(line) = formatter::format_message(record, &author, &media_lines, session.tz)? {
            lines.push(line);
            stats.lines_written += 1;
        }
    }

    let path = out_dir.join(transcript_filename(&session.group_name));
    let mut content = lines.join("\n");
    if !content.is_empty() {
        content.push('\n');
    }
    fs::write(&path, content)
        .map_err(|e| AppError::io(format!("Failed to write {}", path.display()), e))?;

    directory.save()?;

    tracing::info!(
        "Exported {} of {} messages to {}",
        stats.lines_written,
        stats.messages_seen,
        path.display()
    );

    Ok(stats)
}

/// Transcript filename for a group name.
#[must_use]
pub fn transcript_filename(group_name: &str) -> String {
    format!("WhatsApp Chat with {group_name}.txt")
}

/// Collects the distinct participant-set keys and, when the source file
/// interleaves more than one conversation, asks the picker which to keep.
/// Returns `None` when no partitioning is needed.
fn select_conversations<M: ChatMessage>(
    records: &[M],
    group_name: &str,
    picker: &mut dyn ConversationPicker,
) -> Result<Option<Vec<String>>> {
    let sets: BTreeSet<&str> = records.iter().filter_map(ChatMessage::participants).collect();

    if sets.len() <= 1 {
        return Ok(None);
    }

    let sets: Vec<String> = sets.into_iter().map(ToString::to_string).collect();
    tracing::info!("{} distinct conversations in one source file", sets.len());

    picker.pick(group_name, &sets).map(Some)
}

fn resolve_author<M: ChatMessage>(
    record: &M,
    directory: &mut AuthorDirectory,
    names: &mut dyn NameSource,
) -> Result<String> {
    match record.sender() {
        Some(Sender::Display(name)) => Ok(name.to_string()),
        Some(Sender::Id(id)) => directory.resolve(id, names),
        None => Err(AppError::NoSender {
            timestamp_millis: record.timestamp_millis(),
        }),
    }
}
