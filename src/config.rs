use std::{fs, path::Path};

use anyhow::Context;
use console::style;
use dialoguer::{Confirm, Input, Password};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sender identity and SMTP connection settings, persisted in `config.json`.
///
/// Field names keep the spelling used on disk so existing config files keep
/// loading. The password sits in the file in plaintext, so the file should
/// stay private to the user running the tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Display name shown in the recipients' mail client
    #[serde(rename = "fromName")]
    pub from_name: String,

    /// Sender address, also used as the SMTP username
    pub email: String,

    pub password: String,

    #[serde(rename = "smtpServer")]
    pub smtp_server: String,

    #[serde(rename = "smtpPort")]
    pub smtp_port: u16,

    /// Free text appended after the closing line of every report
    pub signature: String,

    /// Use STARTTLS on the SMTP connection
    #[serde(rename = "SSL")]
    pub ssl: bool,

    /// Skip certificate validation so self-signed servers are accepted
    #[serde(rename = "selfSigned")]
    pub self_signed: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            from_name: String::new(),
            email: String::new(),
            password: String::new(),
            smtp_server: String::new(),
            smtp_port: 587,
            signature: String::new(),
            ssl: true,
            self_signed: false,
        }
    }
}

impl Config {
    /// Loads the config if the file exists, otherwise walks the user through
    /// creating one and persists it.
    pub fn load_or_init(path: &Path) -> anyhow::Result<Config> {
        if path.exists() {
            Self::load_from(path)
        } else {
            println!(
                "{}",
                style("A valid config.json file does not exist, creating it now...").white()
            );
            let config = Self::bootstrap()?;
            config.save_to(path)?;
            Ok(config)
        }
    }

    fn load_from(path: &Path) -> anyhow::Result<Config> {
        debug!("Loading Config from: {path:?}");
        let file_contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read contents of {path:?}"))?;

        let stored: Value = match serde_json::from_str(&file_contents) {
            Ok(value) => value,
            Err(e) => {
                error!("Invalid config file {path:?}: {e}");
                warn!("Continuing with a default configuration, the SMTP settings are likely unusable");
                return Ok(Config::default());
            }
        };

        let (reconciled, changed) = reconcile(stored);
        let config: Config = serde_json::from_value(Value::Object(reconciled))
            .with_context(|| format!("Failed to interpret contents of {path:?}"))?;

        if changed {
            info!("Config keys were out of date, rewriting {path:?}");
            config.save_to(path)?;
        }

        println!("{}", style("Successfully loaded configuration!").green());
        Ok(config)
    }

    fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        let json = to_pretty_json(self)?;
        fs::write(path, json).with_context(|| format!("Failed to write config to {path:?}"))?;
        Ok(())
    }

    /// Asks for every config field in a fixed order. The port falls back to
    /// 587 when the entered value is not a valid number.
    fn bootstrap() -> anyhow::Result<Config> {
        println!();
        println!("  Please tell me your desired sender name (it will be displayed in the recipients' email client, e.g. 'John Wick, PhD, Renewable Energy Tech Lead'):");
        let from_name: String = Input::new()
            .with_prompt(" =>")
            .allow_empty(true)
            .interact_text()?;

        println!("  Please tell me your email:");
        let email: String = Input::new()
            .with_prompt(" =>")
            .allow_empty(true)
            .interact_text()?;

        println!("  Please tell me your email password:");
        let password = Password::new().with_prompt(" =>").interact()?;

        println!("  Please tell me your SMTP server address:");
        let smtp_server: String = Input::new()
            .with_prompt(" =>")
            .allow_empty(true)
            .interact_text()?;

        println!("  Please tell me your SMTP server port (usually 587):");
        let port_input: String = Input::new()
            .with_prompt(" =>")
            .allow_empty(true)
            .interact_text()?;
        let smtp_port = match port_input.trim().parse() {
            Ok(port) => port,
            Err(_) => {
                warn!("{port_input:?} is not a valid port number, falling back to 587");
                587
            }
        };

        println!("  Please configure your signature (just name + surname, please):");
        let signature: String = Input::new()
            .with_prompt(" =>")
            .allow_empty(true)
            .interact_text()?;

        let ssl = Confirm::new()
            .with_prompt("Does the connection use transport encryption (STARTTLS)?")
            .default(true)
            .interact()?;

        let self_signed = Confirm::new()
            .with_prompt("Accept self-signed certificates?")
            .default(false)
            .interact()?;

        Ok(Config {
            from_name,
            email,
            password,
            smtp_server,
            smtp_port,
            signature,
            ssl,
            self_signed,
        })
    }
}

/// Merges a stored config object against the canonical default shape: keys
/// the default record does not have are dropped, missing keys are filled with
/// their default values. Key order follows the canonical record. Returns
/// whether anything changed, so an already-canonical file is never rewritten.
fn reconcile(stored: Value) -> (Map<String, Value>, bool) {
    let mut stored = match stored {
        Value::Object(map) => map,
        other => {
            warn!("Config file did not contain an object but {other:?}, starting from defaults");
            Map::new()
        }
    };

    let mut result = Map::new();
    let mut changed = false;
    for (key, default_value) in canonical_shape() {
        match stored.remove(&key) {
            Some(value) => {
                result.insert(key, value);
            }
            None => {
                debug!("Config key {key:?} was missing, filling with default");
                result.insert(key, default_value);
                changed = true;
            }
        }
    }

    if !stored.is_empty() {
        debug!("Dropping obsolete config keys: {:?}", stored.keys());
        changed = true;
    }

    (result, changed)
}

fn canonical_shape() -> Map<String, Value> {
    match serde_json::to_value(Config::default()) {
        Ok(Value::Object(map)) => map,
        _ => unreachable!("default config always serializes to an object"),
    }
}

/// Serializes with a 4-space indent to match the on-disk format the tool has
/// always used.
pub(crate) fn to_pretty_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .context("Failed to serialize to JSON")?;
    String::from_utf8(buf).context("Serialized JSON was not valid UTF-8")
}
