//! Interactive stdin collaborators.
//!
//! Implements the name-resolution and conversation-selection capabilities
//! as terminal prompts. Both block the pipeline until answered; tests
//! substitute stub implementations of the same traits.

use std::io::{self, BufRead, Write};

use comfy_table::{presets::UTF8_FULL, Table};

use crate::domain::{AppError, ConversationPicker, NameSource, Result};

/// Asks the user for a display name over stdin.
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl NameSource for StdinPrompt {
    fn name_for(&mut self, identifier: &str) -> Result<String> {
        print!("Full name for phone number {identifier}: ");
        io::stdout()
            .flush()
            .map_err(|e| AppError::io("Failed to flush prompt", e))?;

        Ok(read_line()?.trim().to_string())
    }
}

/// Asks the user which participant sets to export.
#[derive(Debug, Default)]
pub struct StdinPicker;

impl ConversationPicker for StdinPicker {
    fn pick(&mut self, group_name: &str, sets: &[String]) -> Result<Vec<String>> {
        println!("There are multiple conversations in this backup.");
        println!("(sometimes, this can happen if your own phone number does not show up in");
        println!("all messages of a particular group chat)");
        println!("Please select which conversations to include in: '{group_name}'");
        println!();
        println!("{}", selection_table(sets));
        println!();
        print!("Space-separated list of choices: ");
        io::stdout()
            .flush()
            .map_err(|e| AppError::io("Failed to flush prompt", e))?;

        let answer = read_line()?;
        parse_selection(&answer, sets)
    }
}

/// Renders the numbered participant-set listing.
fn selection_table(sets: &[String]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "Participants"]);

    for (i, set) in sets.iter().enumerate() {
        table.add_row(vec![&i.to_string(), set]);
    }

    table.to_string()
}

/// Maps a space-separated index answer onto the listed sets.
fn parse_selection(answer: &str, sets: &[String]) -> Result<Vec<String>> {
    let mut selected = Vec::new();

    for token in answer.split_whitespace() {
        let index: usize = token.parse().map_err(|_| {
            AppError::invalid_data(format!("'{token}' is not a conversation number"))
        })?;

        let set = sets.get(index).ok_or_else(|| {
            AppError::invalid_data(format!("conversation number {index} is out of range"))
        })?;

        if !selected.contains(set) {
            selected.push(set.clone());
        }
    }

    if selected.is_empty() {
        return Err(AppError::invalid_data(
            "no conversations selected".to_string(),
        ));
    }

    Ok(selected)
}

fn read_line() -> Result<String> {
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| AppError::io("Failed to read answer", e))?;
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sets() -> Vec<String> {
        vec![
            "+15551230001, +15551230002".to_string(),
            "+15551230001, +15551230003".to_string(),
        ]
    }

    #[test]
    fn test_parse_selection_single() {
        let selected = parse_selection("0", &sets()).unwrap();
        assert_eq!(selected, vec!["+15551230001, +15551230002".to_string()]);
    }

    #[test]
    fn test_parse_selection_multiple_and_duplicates() {
        let selected = parse_selection("1 0 1", &sets()).unwrap();
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_parse_selection_rejects_junk() {
        assert!(parse_selection("zero", &sets()).is_err());
        assert!(parse_selection("7", &sets()).is_err());
        assert!(parse_selection("", &sets()).is_err());
    }

    #[test]
    fn test_selection_table_lists_every_set() {
        let rendered = selection_table(&sets());
        assert!(rendered.contains("+15551230002"));
        assert!(rendered.contains("+15551230003"));
    }
}
