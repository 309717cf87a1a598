//! Launch dispatcher.
//!
//! Turns a trigger plus the current settings into exactly one launch: either a
//! templated command line run through the shell, or one or two editor URLs.

use crate::commands::Trigger;
use crate::config::{Settings, DEFAULT_EXECUTE_TEMPLATE};
use crate::host::{FileRef, Host};
use crate::system::System;
use crate::template::{self, Vars};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info};

/// How the editor is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMethod {
    /// Run the command template through the shell.
    Command,
    /// Open a `<protocol>://file/...` URL.
    Url,
}

impl LaunchMethod {
    /// The method the ribbon icon uses.
    pub fn for_ribbon(settings: &Settings) -> Self {
        if settings.ribbon_command_uses_code {
            LaunchMethod::Command
        } else {
            LaunchMethod::Url
        }
    }
}

/// Values substituted into templates, computed fresh for every launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchContext {
    pub vault_path: String,
    pub file_path: String,
    pub folder_path: String,
    /// 1-based
    pub line: u32,
    /// 1-based
    pub ch: u32,
}

impl LaunchContext {
    /// Resolves the context for `target`, or for the host's active file when
    /// `target` is `None`. Returns `None` when the vault has no filesystem path.
    pub fn resolve<H: Host + ?Sized>(host: &H, target: Option<FileRef>) -> Option<Self> {
        let vault_path = host.vault_path()?;
        let file = target.or_else(|| host.active_file());
        let cursor = host.cursor().unwrap_or_default();

        Some(Self {
            vault_path,
            file_path: file.as_ref().map(|f| f.path.clone()).unwrap_or_default(),
            folder_path: file.as_ref().map(|f| f.folder().to_string()).unwrap_or_default(),
            line: cursor.line.saturating_add(1),
            ch: cursor.ch.saturating_add(1),
        })
    }

    pub fn vars(&self) -> Vars<'static> {
        Vars::new()
            .with(template::VAULT_PATH, self.vault_path.as_str())
            .with(template::FILE_PATH, self.file_path.as_str())
            .with(template::FOLDER_PATH, self.folder_path.as_str())
            .with(template::LINE, self.line.to_string())
            .with(template::CH, self.ch.to_string())
    }
}

/// The URLs to open and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlPlan {
    /// Open one URL now.
    Single(String),
    /// Open `workspace` now, then `file` once `delay` has passed.
    Staged {
        workspace: String,
        delay: Duration,
        file: String,
    },
}

impl UrlPlan {
    pub fn build(settings: &Settings, ctx: &LaunchContext) -> Self {
        let protocol = settings.url_protocol();
        let mut url = format!("{}://file/{}", protocol, ctx.vault_path);

        if !settings.open_file {
            return UrlPlan::Single(url);
        }
        url.push('/');
        url.push_str(&ctx.file_path);

        match settings.workspace_path() {
            Some(workspace) => {
                let vars = Vars::new().with(template::VAULT_PATH, ctx.vault_path.as_str());
                UrlPlan::Staged {
                    workspace: format!("{}://file/{}", protocol, template::substitute(workspace, &vars)),
                    delay: settings.activation_delay(),
                    file: url,
                }
            }
            None => UrlPlan::Single(url),
        }
    }

    /// Opens the first URL immediately. A staged second URL is opened from a
    /// spawned task; the returned handle resolves once it has been opened.
    /// There is no way to cancel it.
    pub fn run<S: System>(self, system: Arc<S>) -> Option<JoinHandle<()>> {
        match self {
            UrlPlan::Single(url) => {
                open_logged(system.as_ref(), &url);
                None
            }
            UrlPlan::Staged {
                workspace,
                delay,
                file,
            } => {
                let deadline = Instant::now() + delay;
                open_logged(system.as_ref(), &workspace);
                Some(tokio::spawn(async move {
                    tokio::time::sleep_until(deadline).await;
                    open_logged(system.as_ref(), &file);
                }))
            }
        }
    }
}

fn open_logged<S: System + ?Sized>(system: &S, url: &str) {
    info!(%url, "opening URL");
    if let Err(e) = system.open_url(url) {
        error!("{:#}", e);
    }
}

/// Dispatches triggers against a host and the operating system.
pub struct Dispatcher<'a, H: ?Sized, S> {
    settings: &'a Settings,
    host: &'a H,
    system: Arc<S>,
}

impl<'a, H: Host + ?Sized, S: System> Dispatcher<'a, H, S> {
    pub fn new(settings: &'a Settings, host: &'a H, system: Arc<S>) -> Self {
        Self {
            settings,
            host,
            system,
        }
    }

    /// Handles one trigger. Returns a handle while the launch is still in
    /// flight: a running command or a deferred URL open.
    pub fn fire(&self, trigger: Trigger) -> Option<JoinHandle<()>> {
        match trigger {
            Trigger::Ribbon => {
                if !self.settings.ribbon_icon {
                    info!("ribbon icon is disabled; nothing to do");
                    return None;
                }
                self.launch(LaunchMethod::for_ribbon(self.settings))
            }
            Trigger::Command(command) => self.launch(command.method(self.settings)),
            Trigger::FileMenu(file) => {
                if !self.settings.show_file_context_menu_item {
                    info!("file menu item is disabled; nothing to do");
                    return None;
                }
                self.open_via_command(Some(file))
            }
        }
    }

    pub fn launch(&self, method: LaunchMethod) -> Option<JoinHandle<()>> {
        match method {
            LaunchMethod::Command => self.open_via_command(None),
            LaunchMethod::Url => self.open_via_url(),
        }
    }

    /// Runs the command template for `target`, or for the active file.
    ///
    /// The process runs on the blocking pool, so a command that waits for the
    /// editor to close never holds up other triggers or a deferred URL open.
    pub fn open_via_command(&self, target: Option<FileRef>) -> Option<JoinHandle<()>> {
        let Some(ctx) = LaunchContext::resolve(self.host, target) else {
            debug!("vault has no filesystem path; skipping command launch");
            return None;
        };

        let command = template::substitute_or(
            &self.settings.execute_template,
            DEFAULT_EXECUTE_TEMPLATE,
            &ctx.vars(),
        );
        info!(%command, "running command");
        let system = Arc::clone(&self.system);
        Some(tokio::task::spawn_blocking(move || {
            if let Err(e) = system.exec(&command) {
                error!("{}", e);
            }
        }))
    }

    pub fn open_via_url(&self) -> Option<JoinHandle<()>> {
        let Some(ctx) = LaunchContext::resolve(self.host, None) else {
            debug!("vault has no filesystem path; skipping URL launch");
            return None;
        };

        UrlPlan::build(self.settings, &ctx).run(Arc::clone(&self.system))
    }
}
