//! Application layer - use cases and orchestration.
//!
//! This layer contains the parsing of both source formats and the
//! formatting and export pipeline they share.

pub mod exporter;
pub mod formatter;
pub mod groupme;
pub mod mms;

pub use exporter::{export, transcript_filename};
pub use formatter::{apply_system_event, format_message, format_stats, format_timestamp};
