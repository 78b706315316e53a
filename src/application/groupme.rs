//! GroupMe export parsing.
//!
//! Handles conversion from the `messages.json` file of a GroupMe export
//! to domain records. The export stores timestamps as epoch seconds and
//! messages in reverse-chronological order.

use serde::Deserialize;

use crate::domain::{
    AppError, Attachment, ChatMessage, MediaPayload, Result, Sender, SystemEvent,
};

/// Marker embedded in system message text for group renames.
const RENAME_MARKER: &str = " changed the group's name to ";

/// Sentinel user id for system/metadata messages.
const SYSTEM_USER_ID: &str = "system";

/// Event type tag for avatar changes.
const AVATAR_EVENT: &str = "group.avatar_change";

/// Raw message as stored in the export (JSON format).
#[derive(Debug, Deserialize)]
struct RawMessage {
    created_at: i64,
    #[serde(default)]
    user_id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    attachments: Vec<RawAttachment>,
    #[serde(default)]
    event: Option<RawEvent>,
}

#[derive(Debug, Deserialize)]
struct RawAttachment {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    data: Option<RawEventData>,
}

#[derive(Debug, Deserialize, Default)]
struct RawEventData {
    #[serde(default)]
    avatar_url: Option<String>,
}

/// One message from a GroupMe export.
#[derive(Debug, Clone)]
pub struct GroupMeMessage {
    timestamp_millis: i64,
    user_id: String,
    name: String,
    text: String,
    attachments: Vec<Attachment>,
    avatar_url: Option<String>,
}

impl ChatMessage for GroupMeMessage {
    fn timestamp_millis(&self) -> i64 {
        self.timestamp_millis
    }

    fn sender(&self) -> Option<Sender<'_>> {
        if self.user_id == SYSTEM_USER_ID {
            None
        } else {
            Some(Sender::Display(&self.name))
        }
    }

    fn body(&self) -> &str {
        &self.text
    }

    fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    fn system_event(&self) -> Option<SystemEvent> {
        if self.user_id != SYSTEM_USER_ID {
            return None;
        }

        if let Some((_, new_name)) = self.text.split_once(RENAME_MARKER) {
            return Some(SystemEvent::GroupRename {
                new_name: new_name.to_string(),
            });
        }

        if let Some(url) = &self.avatar_url {
            return Some(SystemEvent::AvatarChange { url: url.clone() });
        }

        Some(SystemEvent::Other)
    }
}

/// Parses a GroupMe `messages.json` export.
///
/// # Errors
/// Returns error if the file is not the expected JSON structure.
pub fn parse_export(json: &str) -> Result<Vec<GroupMeMessage>> {
    let raw: Vec<RawMessage> = serde_json::from_str(json).map_err(AppError::json_parse)?;

    Ok(raw.into_iter().map(into_message).collect())
}

fn into_message(raw: RawMessage) -> GroupMeMessage {
    let attachments = raw
        .attachments
        .into_iter()
        .filter_map(|a| {
            // Attachment kinds without a URL (mentions, emoji) carry no media.
            a.url.map(|url| Attachment {
                content_type: a.kind,
                payload: MediaPayload::Remote { url },
                original_name: None,
            })
        })
        .collect();

    let avatar_url = raw
        .event
        .filter(|e| e.kind == AVATAR_EVENT)
        .and_then(|e| e.data.unwrap_or_default().avatar_url);

    GroupMeMessage {
        timestamp_millis: raw.created_at * 1000,
        user_id: raw.user_id,
        name: raw.name,
        text: raw.text.unwrap_or_default(),
        attachments,
        avatar_url,
    }
}
