use std::{fs, path::Path, sync::OnceLock};

use anyhow::Context;
use console::style;
use dialoguer::Input;
use log::{debug, error};
use regex::Regex;

use crate::config::to_pretty_json;

/// Checks the address against standard mailbox syntax: a local part, an `@`,
/// and a dotted domain.
pub fn is_valid_email(address: &str) -> bool {
    static CELL: OnceLock<Regex> = OnceLock::new();
    let re = CELL.get_or_init(|| {
        debug!("Compiling regex for validating email addresses");
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)+$")
            .expect("failed to compile regex")
    });
    re.is_match(address)
}

/// Loads the recipient list if the file exists, otherwise collects one
/// interactively and persists it. A malformed file is reported but not fatal;
/// the run continues with an empty list.
pub fn load_or_init(path: &Path) -> anyhow::Result<Vec<String>> {
    if path.exists() {
        let file_contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read contents of {path:?}"))?;
        match serde_json::from_str::<Vec<String>>(&file_contents) {
            Ok(recipients) => {
                println!(
                    "{}",
                    style(format!("Loaded {} mail recipient(s)!", recipients.len())).green()
                );
                Ok(recipients)
            }
            Err(e) => {
                error!("Invalid recipients file {path:?}: {e}");
                Ok(Vec::new())
            }
        }
    } else {
        println!(
            "{}",
            style("The recipients.json file does not exist, creating it now...").white()
        );
        let recipients = collect()?;
        let json = to_pretty_json(&recipients)?;
        fs::write(path, json).with_context(|| format!("Failed to write recipients to {path:?}"))?;
        Ok(recipients)
    }
}

/// Prompt loop: one address per line, insertion order kept, an empty line
/// ends the list. Addresses failing the syntax check are rejected with a
/// warning and never reach the list.
fn collect() -> anyhow::Result<Vec<String>> {
    println!();
    println!("  Please tell me the recipients you would like to address your reports to (to finish adding items, leave empty & accept):");

    let mut recipients = Vec::new();
    loop {
        let entry: String = Input::new()
            .with_prompt(" =>")
            .allow_empty(true)
            .interact_text()?;
        if entry.is_empty() {
            break;
        }
        if is_valid_email(&entry) {
            recipients.push(entry);
        } else {
            println!(
                "{}",
                style("This does not seem to be a valid email. Please try again.").yellow()
            );
        }
    }
    Ok(recipients)
}
