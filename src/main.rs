//! vault-code - open the current vault note in VS Code.
//!
//! Launches the editor either by running a templated `code` command line or by
//! opening a `vscode://file/...` URL. The vault, active file and cursor come
//! from the command line, standing in for the document application that would
//! normally supply them.

mod commands;
mod config;
mod host;
mod launcher;
mod system;
mod template;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use commands::{CommandId, Trigger};
use config::{SettingKey, Settings};
use host::{CliHost, FileRef};
use launcher::Dispatcher;
use system::Os;

/// Command-line arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (defaults to $XDG_CONFIG_HOME/vault-code/data.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More diagnostics on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Do what the ribbon icon does
    Ribbon(ContextArgs),
    /// Run a named command (see `vault-code commands`)
    Run {
        /// Command id, e.g. open-vscode-via-url
        id: String,
        #[command(flatten)]
        context: ContextArgs,
    },
    /// Open a specific vault file, as from its context menu
    OpenFile {
        /// Vault-relative path of the file or folder
        path: String,
        #[command(flatten)]
        context: ContextArgs,
    },
    /// List the available commands and menu entries
    Commands,
    /// Inspect or change settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

/// Where the user is in the vault.
#[derive(Args, Debug, Clone, Default)]
struct ContextArgs {
    /// Absolute path of the vault root
    #[arg(long)]
    vault: Option<PathBuf>,
    /// Vault-relative path of the active file
    #[arg(long)]
    file: Option<String>,
    /// Cursor line (1-based)
    #[arg(long)]
    line: Option<u32>,
    /// Cursor column (1-based)
    #[arg(long)]
    ch: Option<u32>,
}

impl ContextArgs {
    fn into_host(self) -> CliHost {
        CliHost::new(self.vault, self.file, self.line, self.ch)
    }
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    /// Print the effective settings as JSON
    Show,
    /// Print the settings file location
    Path,
    /// Change one setting and save
    Set { key: String, value: String },
    /// Restore every setting to its default
    Reset,
}

// --- Main Application Logic ---

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Diagnostics go to stderr
    init_logging(cli.verbose);

    // 2. Load settings (migrating legacy keys on the way)
    let settings_path = cli.config.clone().unwrap_or_else(Settings::default_path);
    let settings = Settings::load(&settings_path)?;
    debug!(path = %settings_path.display(), "settings loaded");

    // 3. Handle the subcommand
    let (trigger, context) = match cli.command {
        Command::Ribbon(context) => (Trigger::Ribbon, context),
        Command::Run { id, context } => {
            let command = CommandId::from_id(&id).with_context(|| {
                format!("Unknown command '{}'. Available commands: {}", id, command_ids())
            })?;
            (Trigger::Command(command), context)
        }
        Command::OpenFile { path, context } => (Trigger::FileMenu(FileRef::new(path)), context),
        Command::Commands => {
            print_commands(&settings);
            return Ok(());
        }
        Command::Settings { action } => {
            return settings_command(action, settings, &settings_path);
        }
    };

    // 4. Launch, then wait for the command or deferred URL open so it is not lost on exit
    let host = context.into_host();
    let dispatcher = Dispatcher::new(&settings, &host, Arc::new(Os));
    if let Some(pending) = dispatcher.fire(trigger) {
        if let Err(e) = pending.await {
            error!("launch task failed: {}", e);
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn command_ids() -> String {
    CommandId::ALL
        .iter()
        .map(|command| command.id())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_commands(settings: &Settings) {
    for command in CommandId::ALL {
        println!("{:<26} {}", command.id(), command.name());
    }

    println!();
    match commands::ribbon_item(settings) {
        Some(item) => println!(
            "Ribbon:    {} [{}] (opens via {:?})",
            item.title,
            item.icon,
            launcher::LaunchMethod::for_ribbon(settings)
        ),
        None => println!("Ribbon:    hidden"),
    }
    match commands::file_menu_item(settings) {
        Some(item) => println!("File menu: {} [{}]", item.title, item.icon),
        None => println!("File menu: hidden"),
    }
}

fn settings_command(action: SettingsAction, mut settings: Settings, path: &Path) -> Result<()> {
    match action {
        SettingsAction::Show => {
            let json = serde_json::to_string_pretty(&settings).context("Failed to serialize settings")?;
            println!("{}", json);
        }
        SettingsAction::Path => println!("{}", path.display()),
        SettingsAction::Set { key, value } => {
            let key: SettingKey = key.parse()?;
            settings.set(key, &value)?;
            settings.save(path)?;
            println!("[Settings] {} saved to {}", key, path.display());
        }
        SettingsAction::Reset => {
            let extra = std::mem::take(&mut settings.extra);
            Settings { extra, ..Settings::default() }.save(path)?;
            println!("[Settings] Defaults restored in {}", path.display());
        }
    }
    Ok(())
}
