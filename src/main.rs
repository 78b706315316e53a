//! whatsapp-export - Convert chat exports to WhatsApp-style chat logs.
//!
//! Reads a GroupMe JSON export or an Android SMS/MMS XML backup and
//! writes a plaintext transcript in the format WhatsApp uses for its own
//! chat exports, downloading or decoding media attachments along the way.
//! The resulting directory can be imported into chat tools that accept
//! WhatsApp history.
//!
//! Usage:
//!   whatsapp-export groupme "Book Club" messages.json
//!   whatsapp-export sms "Family" sms-backup.xml

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use whatsapp_export::application::{exporter, formatter, groupme, mms};
use whatsapp_export::cli::{Cli, Commands};
use whatsapp_export::domain::{self, AppConfig, ChatMessage, SessionContext};
use whatsapp_export::infrastructure::{
    load_config, AuthorDirectory, MediaStore, StdinPicker, StdinPrompt,
};

fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Main application logic.
fn run(cli: Cli) -> domain::Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Groupme {
            group_name,
            input,
            output,
        } => {
            let json = read_source(&input)?;
            let records = groupme::parse_export(&json)?;
            convert(records, &group_name, output, &config)
        }
        Commands::Sms {
            group_name,
            input,
            output,
        } => {
            let xml = read_source(&input)?;
            let records = mms::parse_backup(&xml)?;
            convert(records, &group_name, output, &config)
        }
    }
}

/// Shared conversion path once records are parsed.
fn convert<M: ChatMessage>(
    records: Vec<M>,
    group_name: &str,
    output: Option<PathBuf>,
    config: &AppConfig,
) -> domain::Result<()> {
    let out_dir = output.unwrap_or_else(|| {
        PathBuf::from(format!("{}{}", config.output.dir_prefix, group_name))
    });
    fs::create_dir_all(&out_dir)
        .map_err(|e| domain::AppError::io(format!("Failed to create {}", out_dir.display()), e))?;

    let mut session = SessionContext::with_local_offset(group_name);
    let media = MediaStore::new(&out_dir, &config.media)?;
    let mut directory = AuthorDirectory::load(&config.authors.file)?;
    let mut names = StdinPrompt;
    let mut picker = StdinPicker;

    let stats = exporter::export(
        records,
        &mut session,
        &media,
        &mut directory,
        &mut names,
        &mut picker,
        &out_dir,
    )?;

    println!(
        "{} Exported '{}' to {}",
        "✓".green().bold(),
        session.group_name,
        out_dir.display()
    );
    println!();
    println!("{}", formatter::format_stats(&stats));

    Ok(())
}

fn read_source(path: &Path) -> domain::Result<String> {
    fs::read_to_string(path)
        .map_err(|e| domain::AppError::io(format!("Failed to read {}", path.display()), e))
}

/// Setup tracing/logging based on verbosity level.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
