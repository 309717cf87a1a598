//! Settings management module for vault-code.
//!
//! Settings live in a single flat JSON object. Loading merges the stored object
//! over the defaults, migrates legacy keys, and keeps any keys this version does
//! not know about so they survive the next save.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_EXECUTE_TEMPLATE: &str = r#"code "{{vaultpath}}" "{{vaultpath}}/{{filepath}}""#;
pub const DEFAULT_URL_PROTOCOL: &str = "vscode";
pub const INSIDERS_URL_PROTOCOL: &str = "vscode-insiders";
pub const DEFAULT_WORKSPACE_PATH: &str = "{{vaultpath}}";
pub const DEFAULT_ACTIVATION_DELAY_MS: u64 = 200;

/// Legacy flag that selected the Insiders URL scheme.
const LEGACY_USE_URL_INSIDERS: &str = "useUrlInsiders";
/// Legacy flag that made the ribbon open a URL instead of running a command.
const LEGACY_USE_URL: &str = "useURL";

/// User settings, stored with camelCase keys.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Show the ribbon icon
    pub ribbon_icon: bool,
    /// Ribbon runs the command template when true, opens a URL otherwise
    pub ribbon_command_uses_code: bool,
    /// Offer "Open in VS Code" on the file context menu
    pub show_file_context_menu_item: bool,
    /// Shell command template
    pub execute_template: String,
    /// Append the active file to the URL
    pub open_file: bool,
    /// URL scheme of the target editor
    pub url_protocol: String,
    /// Workspace opened before the file URL
    pub workspace_path: String,
    /// Pause between the workspace URL and the file URL
    pub activation_delay_ms: u64,
    /// Keys written by other versions, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ribbon_icon: true,
            ribbon_command_uses_code: true,
            show_file_context_menu_item: true,
            execute_template: DEFAULT_EXECUTE_TEMPLATE.to_string(),
            open_file: true,
            url_protocol: DEFAULT_URL_PROTOCOL.to_string(),
            workspace_path: DEFAULT_WORKSPACE_PATH.to_string(),
            activation_delay_ms: DEFAULT_ACTIVATION_DELAY_MS,
            extra: Map::new(),
        }
    }
}

impl Settings {
    /// Loads settings from `path`, falling back to defaults when the file is
    /// missing. Legacy keys are migrated and the file is re-saved if any were
    /// found.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {:?}", path))?;
        let (settings, migrated) = Self::from_json(&raw)
            .with_context(|| format!("Failed to parse settings file: {:?}", path))?;

        if migrated {
            info!(path = %path.display(), "migrated legacy settings");
            settings.save(path)?;
        }
        Ok(settings)
    }

    /// Parses a stored settings object. The flag is true when legacy keys
    /// were rewritten.
    pub fn from_json(raw: &str) -> Result<(Self, bool)> {
        let mut object: Map<String, Value> = if raw.trim().is_empty() {
            Map::new()
        } else {
            serde_json::from_str(raw).context("Settings must be a JSON object")?
        };
        let migrated = migrate(&mut object);
        // A null reads the same as a missing key.
        object.retain(|_, value| !value.is_null());
        let settings = serde_json::from_value(Value::Object(object))
            .context("Settings have an unexpected shape")?;
        Ok((settings, migrated))
    }

    /// Writes the settings as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create settings directory: {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, json + "\n")
            .with_context(|| format!("Failed to write settings to: {:?}", path))
    }

    /// Returns the path to the settings file.
    /// Uses XDG_CONFIG_HOME if set, otherwise falls back to ~/.config
    pub fn default_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                    .join(".config")
            });
        config_dir.join("vault-code").join("data.json")
    }

    pub fn url_protocol(&self) -> &str {
        non_blank_or(&self.url_protocol, DEFAULT_URL_PROTOCOL)
    }

    /// Workspace to activate before opening a file, if any.
    ///
    /// An absent key means the default (`{{vaultpath}}`); a stored blank value
    /// switches the workspace step off.
    pub fn workspace_path(&self) -> Option<&str> {
        let path = self.workspace_path.trim();
        (!path.is_empty()).then_some(path)
    }

    pub fn activation_delay(&self) -> Duration {
        Duration::from_millis(self.activation_delay_ms)
    }

    /// Applies one edit the way the settings panel does: strings are trimmed
    /// and a blank string resets the field to its default.
    pub fn set(&mut self, key: SettingKey, value: &str) -> Result<()> {
        let text = value.trim();
        match key {
            SettingKey::RibbonIcon => self.ribbon_icon = parse_bool(key, text)?,
            SettingKey::RibbonCommandUsesCode => {
                self.ribbon_command_uses_code = parse_bool(key, text)?;
            }
            SettingKey::ShowFileContextMenuItem => {
                self.show_file_context_menu_item = parse_bool(key, text)?;
            }
            SettingKey::OpenFile => self.open_file = parse_bool(key, text)?,
            SettingKey::ExecuteTemplate => {
                self.execute_template = non_blank_or(text, DEFAULT_EXECUTE_TEMPLATE).to_string();
            }
            SettingKey::UrlProtocol => {
                self.url_protocol = non_blank_or(text, DEFAULT_URL_PROTOCOL).to_string();
            }
            SettingKey::WorkspacePath => {
                self.workspace_path = non_blank_or(text, DEFAULT_WORKSPACE_PATH).to_string();
            }
            SettingKey::ActivationDelayMs => {
                self.activation_delay_ms = if text.is_empty() {
                    DEFAULT_ACTIVATION_DELAY_MS
                } else {
                    text.parse()
                        .with_context(|| format!("{key} expects milliseconds, got {text:?}"))?
                };
            }
        }
        Ok(())
    }
}

/// Settings that can be edited from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    RibbonIcon,
    RibbonCommandUsesCode,
    ShowFileContextMenuItem,
    ExecuteTemplate,
    OpenFile,
    UrlProtocol,
    WorkspacePath,
    ActivationDelayMs,
}

impl SettingKey {
    pub const ALL: [SettingKey; 8] = [
        SettingKey::RibbonIcon,
        SettingKey::RibbonCommandUsesCode,
        SettingKey::ShowFileContextMenuItem,
        SettingKey::ExecuteTemplate,
        SettingKey::OpenFile,
        SettingKey::UrlProtocol,
        SettingKey::WorkspacePath,
        SettingKey::ActivationDelayMs,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SettingKey::RibbonIcon => "ribbonIcon",
            SettingKey::RibbonCommandUsesCode => "ribbonCommandUsesCode",
            SettingKey::ShowFileContextMenuItem => "showFileContextMenuItem",
            SettingKey::ExecuteTemplate => "executeTemplate",
            SettingKey::OpenFile => "openFile",
            SettingKey::UrlProtocol => "urlProtocol",
            SettingKey::WorkspacePath => "workspacePath",
            SettingKey::ActivationDelayMs => "activationDelayMs",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SettingKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.name() == s)
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(|k| k.name()).collect();
                anyhow::anyhow!("Unknown setting '{}'. Known settings: {}", s, known.join(", "))
            })
    }
}

/// Rewrites legacy keys in place. Returns true if anything changed.
fn migrate(object: &mut Map<String, Value>) -> bool {
    let mut changed = false;

    if let Some(flag) = object.remove(LEGACY_USE_URL_INSIDERS) {
        if flag.as_bool() == Some(true) {
            object.insert(
                "urlProtocol".to_string(),
                Value::String(INSIDERS_URL_PROTOCOL.to_string()),
            );
        }
        changed = true;
    }

    if let Some(flag) = object.remove(LEGACY_USE_URL) {
        if flag.as_bool() == Some(true) {
            object.insert("ribbonCommandUsesCode".to_string(), Value::Bool(false));
        }
        changed = true;
    }

    changed
}

fn non_blank_or<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() {
        default
    } else {
        value
    }
}

fn parse_bool(key: SettingKey, text: &str) -> Result<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => anyhow::bail!("{} expects true or false, got {:?}", key, text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_object_yields_defaults() {
        let (settings, migrated) = Settings::from_json("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert!(!migrated);

        let (settings, _) = Settings::from_json("").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn stored_values_merge_over_defaults() {
        let (settings, _) =
            Settings::from_json(r#"{"openFile": false, "urlProtocol": "vscodium"}"#).unwrap();
        assert!(!settings.open_file);
        assert_eq!(settings.url_protocol(), "vscodium");
        assert!(settings.ribbon_icon);
        assert_eq!(settings.execute_template, DEFAULT_EXECUTE_TEMPLATE);
        assert_eq!(settings.activation_delay(), Duration::from_millis(200));
    }

    #[test]
    fn blank_protocol_reads_as_default() {
        let (settings, _) = Settings::from_json(r#"{"urlProtocol": "  "}"#).unwrap();
        assert_eq!(settings.url_protocol(), DEFAULT_URL_PROTOCOL);
    }

    #[test]
    fn workspace_path_absent_vs_blank() {
        let (settings, _) = Settings::from_json("{}").unwrap();
        assert_eq!(settings.workspace_path(), Some("{{vaultpath}}"));

        let (settings, _) = Settings::from_json(r#"{"workspacePath": ""}"#).unwrap();
        assert_eq!(settings.workspace_path(), None);
    }

    #[test]
    fn null_values_read_as_defaults() {
        let (settings, migrated) = Settings::from_json(
            r#"{"urlProtocol": null, "openFile": false, "activationDelayMs": null, "executeTemplate": null}"#,
        )
        .unwrap();
        assert!(!migrated);
        assert_eq!(settings.url_protocol(), "vscode");
        assert_eq!(settings.execute_template, DEFAULT_EXECUTE_TEMPLATE);
        assert_eq!(settings.activation_delay(), Duration::from_millis(200));
        assert!(!settings.open_file);
        assert!(settings.extra.is_empty());
    }

    #[test]
    fn migrates_use_url_insiders() {
        let (settings, migrated) =
            Settings::from_json(r#"{"useUrlInsiders": true, "openFile": false}"#).unwrap();
        assert!(migrated);
        assert_eq!(settings.url_protocol, INSIDERS_URL_PROTOCOL);
        assert!(!settings.extra.contains_key("useUrlInsiders"));
        assert!(!settings.open_file);
    }

    #[test]
    fn drops_false_use_url_insiders_without_touching_protocol() {
        let (settings, migrated) =
            Settings::from_json(r#"{"useUrlInsiders": false, "urlProtocol": "vscodium"}"#).unwrap();
        assert!(migrated);
        assert_eq!(settings.url_protocol, "vscodium");
    }

    #[test]
    fn migrates_use_url() {
        let (settings, migrated) = Settings::from_json(r#"{"useURL": true}"#).unwrap();
        assert!(migrated);
        assert!(!settings.ribbon_command_uses_code);
        assert!(settings.extra.is_empty());
    }

    #[test]
    fn load_rewrites_file_after_migration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, r#"{"useUrlInsiders": true, "ribbonIcon": false}"#).unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.url_protocol(), "vscode-insiders");
        assert!(!settings.ribbon_icon);

        let stored: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(stored["urlProtocol"], json!("vscode-insiders"));
        assert_eq!(stored["ribbonIcon"], json!(false));
        assert!(stored.get("useUrlInsiders").is_none());
    }

    #[test]
    fn load_missing_file_does_not_create_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data.json");
        assert_eq!(Settings::load(&path).unwrap(), Settings::default());
        assert!(!path.exists());
    }

    #[test]
    fn unknown_keys_survive_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, r#"{"futureOption": [1, 2], "openFile": false}"#).unwrap();

        let settings = Settings::load(&path).unwrap();
        settings.save(&path).unwrap();

        let stored: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(stored["futureOption"], json!([1, 2]));
        assert_eq!(stored["openFile"], json!(false));
    }

    #[test]
    fn rejects_non_object_json() {
        assert!(Settings::from_json("[1, 2]").is_err());
        assert!(Settings::from_json("{not json").is_err());
    }

    #[test]
    fn set_trims_and_resets_blank_strings() {
        let mut settings = Settings::default();
        settings.set(SettingKey::ExecuteTemplate, "  codium {{vaultpath}}  ").unwrap();
        assert_eq!(settings.execute_template, "codium {{vaultpath}}");

        settings.set(SettingKey::ExecuteTemplate, "   ").unwrap();
        assert_eq!(settings.execute_template, DEFAULT_EXECUTE_TEMPLATE);

        settings.set(SettingKey::WorkspacePath, "").unwrap();
        assert_eq!(settings.workspace_path, DEFAULT_WORKSPACE_PATH);

        settings.set(SettingKey::ActivationDelayMs, "350").unwrap();
        assert_eq!(settings.activation_delay(), Duration::from_millis(350));
    }

    #[test]
    fn set_parses_bools() {
        let mut settings = Settings::default();
        settings.set(SettingKey::RibbonIcon, "off").unwrap();
        assert!(!settings.ribbon_icon);
        settings.set(SettingKey::OpenFile, "FALSE").unwrap();
        assert!(!settings.open_file);
        assert!(settings.set(SettingKey::OpenFile, "maybe").is_err());
    }

    #[test]
    fn setting_keys_parse_by_stored_name() {
        for key in SettingKey::ALL {
            assert_eq!(key.name().parse::<SettingKey>().unwrap(), key);
        }
        assert!("useURL".parse::<SettingKey>().is_err());
    }
}
