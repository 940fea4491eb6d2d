//! Named commands and their key bindings.
//!
//! Commands take no arguments; anything they need (a path, a new name) is
//! asked for by the shell after the command fires.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// A user-invokable command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Open,
    Save,
    SaveAs,
    TogglePreview,
    About,
    Rename,
    Quit,
}

impl Command {
    pub const ALL: [Self; 7] = [
        Self::Open,
        Self::Save,
        Self::SaveAs,
        Self::TogglePreview,
        Self::Rename,
        Self::About,
        Self::Quit,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Save => "Save",
            Self::SaveAs => "Save As",
            Self::TogglePreview => "Toggle Preview",
            Self::About => "About",
            Self::Rename => "Rename",
            Self::Quit => "Quit",
        }
    }

    /// Primary key binding, for help text.
    pub const fn key_hint(self) -> &'static str {
        match self {
            Self::Open => "Ctrl+O",
            Self::Save => "Ctrl+S",
            Self::SaveAs => "Ctrl+Shift+S / F12",
            Self::TogglePreview => "Ctrl+P",
            Self::About => "F1",
            Self::Rename => "F2",
            Self::Quit => "Ctrl+Q",
        }
    }
}

/// Map a key press to a command.
///
/// Terminals that cannot report Shift with Ctrl send Ctrl+S for
/// Ctrl+Shift+S; Alt+S and F12 are the portable save-as bindings.
pub fn command_for_key(key: &KeyEvent) -> Option<Command> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    match key.code {
        KeyCode::F(1) => Some(Command::About),
        KeyCode::F(2) => Some(Command::Rename),
        KeyCode::F(12) => Some(Command::SaveAs),
        KeyCode::Char(c) if ctrl && !alt => {
            let upper = c.is_ascii_uppercase();
            match c.to_ascii_lowercase() {
                'o' => Some(Command::Open),
                's' if shift || upper => Some(Command::SaveAs),
                's' => Some(Command::Save),
                'p' => Some(Command::TogglePreview),
                'q' => Some(Command::Quit),
                _ => None,
            }
        }
        KeyCode::Char('s' | 'S') if alt && !ctrl => Some(Command::SaveAs),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_ctrl_bindings() {
        let ctrl = KeyModifiers::CONTROL;
        assert_eq!(command_for_key(&key(KeyCode::Char('o'), ctrl)), Some(Command::Open));
        assert_eq!(command_for_key(&key(KeyCode::Char('s'), ctrl)), Some(Command::Save));
        assert_eq!(
            command_for_key(&key(KeyCode::Char('p'), ctrl)),
            Some(Command::TogglePreview)
        );
        assert_eq!(command_for_key(&key(KeyCode::Char('q'), ctrl)), Some(Command::Quit));
    }

    #[test]
    fn test_save_as_bindings() {
        let ctrl_shift = KeyModifiers::CONTROL | KeyModifiers::SHIFT;
        assert_eq!(
            command_for_key(&key(KeyCode::Char('S'), ctrl_shift)),
            Some(Command::SaveAs)
        );
        assert_eq!(
            command_for_key(&key(KeyCode::Char('s'), ctrl_shift)),
            Some(Command::SaveAs)
        );
        assert_eq!(
            command_for_key(&key(KeyCode::Char('s'), KeyModifiers::ALT)),
            Some(Command::SaveAs)
        );
        assert_eq!(
            command_for_key(&key(KeyCode::F(12), KeyModifiers::NONE)),
            Some(Command::SaveAs)
        );
    }

    #[test]
    fn test_function_keys() {
        assert_eq!(
            command_for_key(&key(KeyCode::F(1), KeyModifiers::NONE)),
            Some(Command::About)
        );
        assert_eq!(
            command_for_key(&key(KeyCode::F(2), KeyModifiers::NONE)),
            Some(Command::Rename)
        );
    }

    #[test]
    fn test_plain_typing_is_not_a_command() {
        assert_eq!(command_for_key(&key(KeyCode::Char('s'), KeyModifiers::NONE)), None);
        assert_eq!(command_for_key(&key(KeyCode::Char('S'), KeyModifiers::SHIFT)), None);
        assert_eq!(command_for_key(&key(KeyCode::Enter, KeyModifiers::NONE)), None);
    }

    #[test]
    fn test_key_release_is_ignored() {
        let mut release = key(KeyCode::Char('s'), KeyModifiers::CONTROL);
        release.kind = KeyEventKind::Release;
        assert_eq!(command_for_key(&release), None);
    }

    #[test]
    fn test_every_command_has_label_and_hint() {
        for command in Command::ALL {
            assert!(!command.label().is_empty());
            assert!(!command.key_hint().is_empty());
        }
    }
}
