//! SMS/MMS backup parsing.
//!
//! Handles conversion from an Android "SMS Backup & Restore" style XML
//! file to domain records. Timestamps are epoch milliseconds and messages
//! are stored oldest-first. A backup may interleave several logical
//! conversations; each record carries a canonical participant-set key so
//! the exporter can partition them.

use std::collections::BTreeSet;

use crate::domain::{
    AppError, Attachment, ChatMessage, MediaPayload, Result, Sender, SystemEvent,
};

/// MMS address type code marking the sender (151 marks CC'd recipients).
const ADDR_TYPE_SENDER: &str = "137";

/// One message from an MMS backup.
#[derive(Debug, Clone)]
pub struct MmsMessage {
    timestamp_millis: i64,
    sender_id: Option<String>,
    participants_key: String,
    body: String,
    attachments: Vec<Attachment>,
}

impl ChatMessage for MmsMessage {
    fn timestamp_millis(&self) -> i64 {
        self.timestamp_millis
    }

    fn sender(&self) -> Option<Sender<'_>> {
        self.sender_id.as_deref().map(Sender::Id)
    }

    fn body(&self) -> &str {
        &self.body
    }

    fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    fn system_event(&self) -> Option<SystemEvent> {
        // The backup format has no system/metadata records.
        None
    }

    fn participants(&self) -> Option<&str> {
        Some(&self.participants_key)
    }
}

/// Parses an SMS/MMS backup XML file.
///
/// # Errors
/// Returns error if the file is not well-formed XML or a message record
/// is missing required attributes.
pub fn parse_backup(xml: &str) -> Result<Vec<MmsMessage>> {
    let doc = roxmltree::Document::parse(xml).map_err(AppError::xml_parse)?;

    doc.root_element()
        .children()
        .filter(|n| n.has_tag_name("mms"))
        .map(|n| parse_mms(&n))
        .collect()
}

fn parse_mms(node: &roxmltree::Node<'_, '_>) -> Result<MmsMessage> {
    let timestamp_millis = node
        .attribute("date")
        .and_then(|d| d.parse::<i64>().ok())
        .ok_or_else(|| AppError::invalid_data("mms record missing a numeric date attribute"))?;

    let addrs = node
        .children()
        .find(|c| c.has_tag_name("addrs"))
        .ok_or_else(|| AppError::invalid_data("mms record has no address list"))?;

    let mut sender_id = None;
    let mut participants = BTreeSet::new();

    for addr in addrs.children().filter(|c| c.has_tag_name("addr")) {
        let address = addr
            .attribute("address")
            .ok_or_else(|| AppError::invalid_data("addr entry missing address attribute"))?;
        let normalized = address.trim_start_matches('+');

        participants.insert(format!("+{normalized}"));

        if sender_id.is_none() && addr.attribute("type") == Some(ADDR_TYPE_SENDER) {
            sender_id = Some(normalized.to_string());
        }
    }

    let participants_key = participants.into_iter().collect::<Vec<_>>().join(", ");

    let mut body = String::new();
    let mut attachments = Vec::new();

    if let Some(parts) = node.children().find(|c| c.has_tag_name("parts")) {
        for part in parts.children().filter(|c| c.has_tag_name("part")) {
            let ct = part
                .attribute("ct")
                .ok_or_else(|| AppError::invalid_data("part entry missing content type"))?;

            match ct {
                // Presentation layout, nothing to render.
                "application/smil" => {}
                "text/plain" => {
                    if body.is_empty() {
                        body = part.attribute("text").unwrap_or_default().to_string();
                    }
                }
                _ => {
                    let data = part.attribute("data").ok_or_else(|| {
                        AppError::invalid_data(format!("{ct} part carries no inline data"))
                    })?;

                    attachments.push(Attachment {
                        content_type: ct.to_string(),
                        payload: MediaPayload::Inline {
                            data: data.to_string(),
                        },
                        original_name: part
                            .attribute("name")
                            .filter(|n| *n != "null")
                            .map(ToString::to_string),
                    });
                }
            }
        }
    }

    Ok(MmsMessage {
        timestamp_millis,
        sender_id,
        participants_key,
        body,
        attachments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT_ONLY: &str = r#"
        <smses count="1">
          <mms date="1624301400000" msg_box="1">
            <parts>
              <part seq="0" ct="application/smil" text="&lt;smil/&gt;"/>
              <part seq="0" ct="text/plain" text="hello"/>
            </parts>
            <addrs>
              <addr address="+15551230001" type="137" charset="106"/>
              <addr address="15551230002" type="151" charset="106"/>
            </addrs>
          </mms>
        </smses>"#;

    #[test]
    fn test_parse_text_message() {
        let messages = parse_backup(TEXT_ONLY).unwrap();
        assert_eq!(messages.len(), 1);

        let msg = &messages[0];
        assert_eq!(msg.timestamp_millis(), 1_624_301_400_000);
        assert_eq!(msg.sender(), Some(Sender::Id("15551230001")));
        assert_eq!(msg.body(), "hello");
        assert!(msg.attachments().is_empty());
        assert!(msg.system_event().is_none());
    }

    #[test]
    fn test_participant_key_is_sorted_and_prefixed() {
        let messages = parse_backup(TEXT_ONLY).unwrap();
        assert_eq!(
            messages[0].participants(),
            Some("+15551230001, +15551230002")
        );
    }

    #[test]
    fn test_parse_media_part() {
        let xml = r#"
            <smses count="1">
              <mms date="1624301400000">
                <parts>
                  <part ct="image/jpeg" name="null" data="aGVsbG8="/>
                  <part ct="text/plain" text="look at this"/>
                </parts>
                <addrs>
                  <addr address="+15551230001" type="137"/>
                </addrs>
              </mms>
            </smses>"#;

        let messages = parse_backup(xml).unwrap();
        let msg = &messages[0];

        assert_eq!(msg.body(), "look at this");
        assert_eq!(msg.attachments().len(), 1);
        assert_eq!(msg.attachments()[0].content_type, "image/jpeg");
        // "null" is the backup's placeholder for a missing name.
        assert_eq!(msg.attachments()[0].original_name, None);
    }

    #[test]
    fn test_sender_missing_is_none() {
        let xml = r#"
            <smses count="1">
              <mms date="1624301400000">
                <parts><part ct="text/plain" text="hi"/></parts>
                <addrs>
                  <addr address="+15551230002" type="151"/>
                </addrs>
              </mms>
            </smses>"#;

        let messages = parse_backup(xml).unwrap();
        assert!(messages[0].sender().is_none());
    }

    #[test]
    fn test_media_part_without_data_is_hard_error() {
        let xml = r#"
            <smses count="1">
              <mms date="1624301400000">
                <parts><part ct="image/png" name="a.png"/></parts>
                <addrs><addr address="+1" type="137"/></addrs>
              </mms>
            </smses>"#;

        assert!(parse_backup(xml).is_err());
    }

    #[test]
    fn test_malformed_xml_is_hard_error() {
        assert!(parse_backup("<smses><mms></smses>").is_err());
    }
}
