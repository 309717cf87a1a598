//! Named commands, the ribbon action and the file-menu item.

use crate::config::Settings;
use crate::host::FileRef;
use crate::launcher::LaunchMethod;

/// Tooltip of the ribbon icon.
pub const RIBBON_TITLE: &str = "VSCode";
/// Label of the file context-menu entry.
pub const FILE_MENU_TITLE: &str = "Open in VS Code";
pub const ICON: &str = "vscode-logo";

/// Something the user did that should open the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Ribbon,
    Command(CommandId),
    /// Context menu on a specific file, independent of the active file.
    FileMenu(FileRef),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandId {
    /// Same method as the ribbon.
    OpenVsCode,
    OpenViaCommand,
    OpenViaUrl,
}

impl CommandId {
    pub const ALL: [CommandId; 3] = [
        CommandId::OpenVsCode,
        CommandId::OpenViaCommand,
        CommandId::OpenViaUrl,
    ];

    pub fn id(self) -> &'static str {
        match self {
            CommandId::OpenVsCode => "open-vscode",
            CommandId::OpenViaCommand => "open-vscode-via-command",
            CommandId::OpenViaUrl => "open-vscode-via-url",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CommandId::OpenVsCode => "Open as Visual Studio Code workspace",
            CommandId::OpenViaCommand => {
                "Open as Visual Studio Code workspace using 'code' command"
            }
            CommandId::OpenViaUrl => "Open as Visual Studio Code workspace using a vscode:// URL",
        }
    }

    pub fn method(self, settings: &Settings) -> LaunchMethod {
        match self {
            CommandId::OpenVsCode => LaunchMethod::for_ribbon(settings),
            CommandId::OpenViaCommand => LaunchMethod::Command,
            CommandId::OpenViaUrl => LaunchMethod::Url,
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|command| command.id() == id)
    }
}

/// An entry the host would add to a menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub title: &'static str,
    pub icon: &'static str,
}

/// The ribbon icon, if enabled.
pub fn ribbon_item(settings: &Settings) -> Option<MenuItem> {
    settings.ribbon_icon.then_some(MenuItem {
        title: RIBBON_TITLE,
        icon: ICON,
    })
}

/// The file context-menu entry, if enabled.
pub fn file_menu_item(settings: &Settings) -> Option<MenuItem> {
    settings.show_file_context_menu_item.then_some(MenuItem {
        title: FILE_MENU_TITLE,
        icon: ICON,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for command in CommandId::ALL {
            assert_eq!(CommandId::from_id(command.id()), Some(command));
        }
        assert_eq!(CommandId::from_id("open-sublime"), None);
    }

    #[test]
    fn ribbon_command_follows_setting() {
        let mut settings = Settings::default();
        assert_eq!(CommandId::OpenVsCode.method(&settings), LaunchMethod::Command);

        settings.ribbon_command_uses_code = false;
        assert_eq!(CommandId::OpenVsCode.method(&settings), LaunchMethod::Url);
        assert_eq!(CommandId::OpenViaCommand.method(&settings), LaunchMethod::Command);
        assert_eq!(CommandId::OpenViaUrl.method(&Settings::default()), LaunchMethod::Url);
    }

    #[test]
    fn menu_items_follow_visibility() {
        let mut settings = Settings::default();
        assert_eq!(file_menu_item(&settings).map(|item| item.title), Some(FILE_MENU_TITLE));
        assert!(ribbon_item(&settings).is_some());

        settings.ribbon_icon = false;
        settings.show_file_context_menu_item = false;
        assert!(ribbon_item(&settings).is_none());
        assert!(file_menu_item(&settings).is_none());
    }
}
