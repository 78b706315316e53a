//! CLI interface using clap.
//!
//! Provides command-line arguments and subcommands for the tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// whatsapp-export - Convert chat exports to WhatsApp-style chat logs.
#[derive(Parser, Debug)]
#[command(name = "whatsapp-export")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to a TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a GroupMe JSON export.
    Groupme {
        /// Group display name (the export itself does not record it).
        group_name: String,

        /// Path to the export's messages.json file.
        input: PathBuf,

        /// Output directory (defaults to the configured prefix + group name).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert an Android SMS/MMS XML backup.
    Sms {
        /// Conversation display name.
        group_name: String,

        /// Path to the backup .xml file.
        input: PathBuf,

        /// Output directory (defaults to the configured prefix + group name).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
