//! End-to-end tests for parsing and exporting both source formats.
//!
//! All scenarios pin the session offset to UTC so transcript timestamps
//! are deterministic, and substitute non-interactive collaborators for
//! the stdin prompts.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::FixedOffset;
use tempfile::tempdir;

use whatsapp_export::application::{exporter, groupme, mms};
use whatsapp_export::domain::{
    AppError, ConversationPicker, MediaConfig, NameSource, Result, SessionContext,
};
use whatsapp_export::infrastructure::{AuthorDirectory, MediaStore};

/// Name source backed by a fixed map; asking for anything else fails the
/// run, which doubles as a "no prompt happened" assertion.
struct MappedNames(HashMap<String, String>);

impl MappedNames {
    fn new(pairs: &[(&str, &str)]) -> Self {
        Self(
            pairs
                .iter()
                .map(|(id, name)| ((*id).to_string(), (*name).to_string()))
                .collect(),
        )
    }
}

impl NameSource for MappedNames {
    fn name_for(&mut self, identifier: &str) -> Result<String> {
        self.0
            .get(identifier)
            .cloned()
            .ok_or_else(|| AppError::invalid_data(format!("unexpected prompt for {identifier}")))
    }
}

/// Picker that keeps only the sets containing a marker participant.
struct KeepContaining(&'static str);

impl ConversationPicker for KeepContaining {
    fn pick(&mut self, _group_name: &str, sets: &[String]) -> Result<Vec<String>> {
        Ok(sets
            .iter()
            .filter(|s| s.contains(self.0))
            .cloned()
            .collect())
    }
}

/// Picker that must never be consulted.
struct NoPicker;

impl ConversationPicker for NoPicker {
    fn pick(&mut self, _group_name: &str, _sets: &[String]) -> Result<Vec<String>> {
        Err(AppError::invalid_data("unexpected conversation prompt"))
    }
}

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

fn media_store(dir: &Path) -> MediaStore {
    MediaStore::new(dir, &MediaConfig::default()).unwrap()
}

#[test]
fn groupme_reverse_order_export_is_chronological() {
    let dir = tempdir().unwrap();

    // GroupMe exports store messages newest-first.
    let json = r#"[
        {"created_at": 1624301460, "user_id": "102", "name": "Neha Paul", "text": "hi!", "attachments": []},
        {"created_at": 1624301400, "user_id": "101", "name": "Amar Paul", "text": "hello", "attachments": []}
    ]"#;
    let records = groupme::parse_export(json).unwrap();

    let mut session = SessionContext::new("Fam", utc());
    let media = media_store(dir.path());
    let mut directory = AuthorDirectory::load(dir.path().join("members.json")).unwrap();
    let mut names = MappedNames::new(&[]);

    let stats = exporter::export(
        records,
        &mut session,
        &media,
        &mut directory,
        &mut names,
        &mut NoPicker,
        dir.path(),
    )
    .unwrap();

    let transcript = fs::read_to_string(dir.path().join("WhatsApp Chat with Fam.txt")).unwrap();
    assert_eq!(
        transcript,
        "6/21/21, 17:30 - Amar Paul: hello\n6/21/21, 17:31 - Neha Paul: hi!\n"
    );
    assert_eq!(stats.lines_written, 2);
    assert_eq!(stats.suppressed, 0);
}

#[test]
fn group_rename_is_suppressed_and_renames_the_transcript() {
    let dir = tempdir().unwrap();

    let json = r#"[
        {"created_at": 1624301460, "user_id": "101", "name": "Amar Paul", "text": "nice name", "attachments": []},
        {"created_at": 1624301430, "user_id": "system", "name": "GroupMe", "text": "Neha Paul changed the group's name to Book Club", "attachments": []},
        {"created_at": 1624301400, "user_id": "101", "name": "Amar Paul", "text": "hello", "attachments": []}
    ]"#;
    let records = groupme::parse_export(json).unwrap();

    let mut session = SessionContext::new("Old Name", utc());
    let media = media_store(dir.path());
    let mut directory = AuthorDirectory::load(dir.path().join("members.json")).unwrap();
    let mut names = MappedNames::new(&[]);

    let stats = exporter::export(
        records,
        &mut session,
        &media,
        &mut directory,
        &mut names,
        &mut NoPicker,
        dir.path(),
    )
    .unwrap();

    // The rename event produces no line, but the file carries the new name.
    assert!(!dir.path().join("WhatsApp Chat with Old Name.txt").exists());
    let transcript =
        fs::read_to_string(dir.path().join("WhatsApp Chat with Book Club.txt")).unwrap();
    assert_eq!(
        transcript,
        "6/21/21, 17:30 - Amar Paul: hello\n6/21/21, 17:31 - Amar Paul: nice name\n"
    );
    assert_eq!(stats.suppressed, 1);
}

#[test]
fn mms_selection_drops_unselected_conversations() {
    let dir = tempdir().unwrap();

    let xml = r#"
        <smses count="3">
          <mms date="1624301400000">
            <parts><part ct="text/plain" text="hello"/></parts>
            <addrs>
              <addr address="+15551230001" type="137"/>
              <addr address="+15551230002" type="151"/>
            </addrs>
          </mms>
          <mms date="1624301460000">
            <parts><part ct="text/plain" text="hi!"/></parts>
            <addrs>
              <addr address="+15551230002" type="137"/>
              <addr address="+15551230001" type="151"/>
            </addrs>
          </mms>
          <mms date="1624301520000">
            <parts><part ct="text/plain" text="wrong number"/></parts>
            <addrs>
              <addr address="+15551230009" type="137"/>
              <addr address="+15551230001" type="151"/>
            </addrs>
          </mms>
        </smses>"#;
    let records = mms::parse_backup(xml).unwrap();

    let mut session = SessionContext::new("Fam", utc());
    let media = media_store(dir.path());
    let mut directory = AuthorDirectory::load(dir.path().join("members.json")).unwrap();
    let mut names = MappedNames::new(&[
        ("15551230001", "Amar Paul"),
        ("15551230002", "Neha Paul"),
    ]);
    let mut picker = KeepContaining("+15551230002");

    let stats = exporter::export(
        records,
        &mut session,
        &media,
        &mut directory,
        &mut names,
        &mut picker,
        dir.path(),
    )
    .unwrap();

    let transcript = fs::read_to_string(dir.path().join("WhatsApp Chat with Fam.txt")).unwrap();
    assert_eq!(
        transcript,
        "6/21/21, 17:30 - Amar Paul: hello\n6/21/21, 17:31 - Neha Paul: hi!\n"
    );
    assert!(!transcript.contains("wrong number"));
    assert_eq!(stats.excluded, 1);
}

#[test]
fn mms_inline_media_is_materialized_and_referenced() {
    let dir = tempdir().unwrap();

    // "aGVsbG8=" is base64 for "hello".
    let xml = r#"
        <smses count="1">
          <mms date="1624301400000">
            <parts>
              <part ct="application/smil" text="&lt;smil/&gt;"/>
              <part ct="image/jpeg" name="photo.jpeg" data="aGVsbG8="/>
            </parts>
            <addrs><addr address="+15551230001" type="137"/></addrs>
          </mms>
        </smses>"#;
    let records = mms::parse_backup(xml).unwrap();

    let mut session = SessionContext::new("Fam", utc());
    let media = media_store(dir.path());
    let mut directory = AuthorDirectory::load(dir.path().join("members.json")).unwrap();
    let mut names = MappedNames::new(&[("15551230001", "Amar Paul")]);

    let stats = exporter::export(
        records,
        &mut session,
        &media,
        &mut directory,
        &mut names,
        &mut NoPicker,
        dir.path(),
    )
    .unwrap();

    // Extension normalized jpeg -> jpg, named <timestamp>-<stem>.<ext>.
    let media_path = dir.path().join("1624301400000-photo.jpg");
    assert_eq!(fs::read(&media_path).unwrap(), b"hello");
    assert_eq!(stats.media_files, 1);

    let transcript = fs::read_to_string(dir.path().join("WhatsApp Chat with Fam.txt")).unwrap();
    assert_eq!(
        transcript,
        "6/21/21, 17:30 - Amar Paul: 1624301400000-photo.jpg (file attached)\n"
    );
}

#[test]
fn mms_without_sender_aborts_the_run() {
    let dir = tempdir().unwrap();

    let xml = r#"
        <smses count="1">
          <mms date="1624301400000">
            <parts><part ct="text/plain" text="hi"/></parts>
            <addrs><addr address="+15551230002" type="151"/></addrs>
          </mms>
        </smses>"#;
    let records = mms::parse_backup(xml).unwrap();

    let mut session = SessionContext::new("Fam", utc());
    let media = media_store(dir.path());
    let mut directory = AuthorDirectory::load(dir.path().join("members.json")).unwrap();
    let mut names = MappedNames::new(&[]);

    let result = exporter::export(
        records,
        &mut session,
        &media,
        &mut directory,
        &mut names,
        &mut NoPicker,
        dir.path(),
    );

    assert!(matches!(result, Err(AppError::NoSender { .. })));
}

#[test]
fn author_directory_persists_across_runs() {
    let dir = tempdir().unwrap();
    let members = dir.path().join("members.json");

    let xml = r#"
        <smses count="1">
          <mms date="1624301400000">
            <parts><part ct="text/plain" text="hello"/></parts>
            <addrs><addr address="+15551230001" type="137"/></addrs>
          </mms>
        </smses>"#;

    // First run resolves the sender through the name source.
    {
        let records = mms::parse_backup(xml).unwrap();
        let mut session = SessionContext::new("Fam", utc());
        let media = media_store(dir.path());
        let mut directory = AuthorDirectory::load(&members).unwrap();
        let mut names = MappedNames::new(&[("15551230001", "Amar Paul")]);

        exporter::export(
            records,
            &mut session,
            &media,
            &mut directory,
            &mut names,
            &mut NoPicker,
            dir.path(),
        )
        .unwrap();
    }

    assert!(members.exists());

    // Second run must succeed without any name source entries at all.
    let records = mms::parse_backup(xml).unwrap();
    let mut session = SessionContext::new("Fam", utc());
    let media = media_store(dir.path());
    let mut directory = AuthorDirectory::load(&members).unwrap();
    let mut names = MappedNames::new(&[]);

    exporter::export(
        records,
        &mut session,
        &media,
        &mut directory,
        &mut names,
        &mut NoPicker,
        dir.path(),
    )
    .unwrap();

    let transcript = fs::read_to_string(dir.path().join("WhatsApp Chat with Fam.txt")).unwrap();
    assert!(transcript.contains("Amar Paul"));
}
