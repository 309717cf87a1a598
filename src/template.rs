//! Template substitution for launch commands and URLs.
//!
//! Templates carry `{{name}}` tokens that are replaced with values from the
//! launch context. Replacement is a single left-to-right pass, so text inserted
//! for one token is never scanned again.

use std::collections::HashMap;

/// Absolute path of the vault root.
pub const VAULT_PATH: &str = "vaultpath";
/// Vault-relative path of the target file.
pub const FILE_PATH: &str = "filepath";
/// Vault-relative path of the target file's folder.
pub const FOLDER_PATH: &str = "folderpath";
/// 1-based cursor line.
pub const LINE: &str = "line";
/// 1-based cursor column.
pub const CH: &str = "ch";

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Token name to replacement value.
#[derive(Debug, Default, Clone)]
pub struct Vars<'a> {
    values: HashMap<&'a str, String>,
}

impl<'a> Vars<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a token value.
    pub fn with(mut self, name: &'a str, value: impl Into<String>) -> Self {
        self.values.insert(name, value.into());
        self
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// Replaces every known `{{name}}` token in `template`.
///
/// Unknown tokens and unmatched braces are copied through untouched.
pub fn substitute(template: &str, vars: &Vars<'_>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + OPEN.len()..];

        let replaced = after_open.find(CLOSE).and_then(|end| {
            vars.get(&after_open[..end])
                .map(|value| (value, end + CLOSE.len()))
        });

        match replaced {
            Some((value, consumed)) => {
                out.push_str(value);
                rest = &after_open[consumed..];
            }
            None => {
                // Not a known token; keep the braces and rescan right after them.
                out.push_str(OPEN);
                rest = after_open;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Substitutes into `template`, or into `default` when `template` is blank.
pub fn substitute_or(template: &str, default: &str, vars: &Vars<'_>) -> String {
    let effective = if template.trim().is_empty() {
        default
    } else {
        template
    };
    substitute(effective, vars)
}
