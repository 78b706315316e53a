//! Convert chat exports to WhatsApp-style chat logs.
//!
//! This crate parses GroupMe JSON exports and Android SMS/MMS XML
//! backups into a shared record model, resolves authors and media
//! attachments, and renders one WhatsApp-style transcript per run.
//!
//! # Layers
//!
//! - [`domain`]: shared models, errors, configuration types
//! - [`application`]: format parsers, the formatter, the exporter
//! - [`infrastructure`]: media store, author directory, prompts, config IO
//! - [`cli`]: command-line definitions

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
