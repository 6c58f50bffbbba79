//! Customizable keybindings for sortbox.
//!
//! Every operator command is bound to one [`Key`]. Editor commands are looked
//! up first while the annotation editor is open, so the same key can mean one
//! thing in the editor and another outside it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A key the operator can press, by name.
///
/// Serialized as its display name (`"space"`, `"left"`, `"z"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Key {
    /// A printable character, stored lowercase
    Char(char),
    Space,
    Tab,
    Enter,
    Escape,
    Delete,
    Backspace,
    Left,
    Right,
    Up,
    Down,
}

impl Key {
    /// Build a character key, normalized to lowercase.
    pub fn char(c: char) -> Self {
        Key::Char(c.to_ascii_lowercase())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{c}"),
            Key::Space => f.write_str("space"),
            Key::Tab => f.write_str("tab"),
            Key::Enter => f.write_str("return"),
            Key::Escape => f.write_str("escape"),
            Key::Delete => f.write_str("delete"),
            Key::Backspace => f.write_str("backspace"),
            Key::Left => f.write_str("left"),
            Key::Right => f.write_str("right"),
            Key::Up => f.write_str("up"),
            Key::Down => f.write_str("down"),
        }
    }
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let key = match lower.as_str() {
            "space" | " " => Key::Space,
            "tab" => Key::Tab,
            "return" | "enter" => Key::Enter,
            "escape" | "esc" => Key::Escape,
            "delete" | "del" => Key::Delete,
            "backspace" => Key::Backspace,
            "left" => Key::Left,
            "right" => Key::Right,
            "up" => Key::Up,
            "down" => Key::Down,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if !c.is_whitespace() => Key::char(c),
                    _ => return Err(format!("unknown key '{}'", s.trim())),
                }
            }
        };
        Ok(key)
    }
}

impl TryFrom<String> for Key {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.to_string()
    }
}

/// Commands that are triggered by a single key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Classify the current image into the selected outcome and advance
    Accept,
    /// Select the first outcome bucket
    SelectFirstOutcome,
    /// Select the second outcome bucket
    SelectSecondOutcome,
    /// Switch between the two outcome buckets
    ToggleOutcome,
    /// Advance without classifying
    Skip,
    /// Undo the most recent classification or annotation save
    Undo,
    /// Open the annotation editor on the current image
    OpenEditor,
    /// Show or hide the box overlay
    ToggleOverlay,
    /// Delete the selected box
    DeleteBox,
    /// Change the label of the selected box
    RelabelBox,
    /// Abort the box being drawn
    CancelDrag,
    /// Save boxes and close the editor
    SaveEditor,
    /// Close the editor discarding changes
    CancelEditor,
    /// Leave the program
    Quit,
}

impl Command {
    /// Get the display name for this command.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Accept => "Accept",
            Command::SelectFirstOutcome => "First outcome",
            Command::SelectSecondOutcome => "Second outcome",
            Command::ToggleOutcome => "Toggle outcome",
            Command::Skip => "Skip",
            Command::Undo => "Undo",
            Command::OpenEditor => "Open editor",
            Command::ToggleOverlay => "Toggle overlay",
            Command::DeleteBox => "Delete box",
            Command::RelabelBox => "Relabel box",
            Command::CancelDrag => "Cancel drag",
            Command::SaveEditor => "Save editor",
            Command::CancelEditor => "Cancel editor",
            Command::Quit => "Quit",
        }
    }
}

/// Keybinding configuration for the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub accept: Key,
    pub outcome_first: Key,
    pub outcome_second: Key,
    pub toggle_outcome: Key,
    pub skip: Key,
    pub undo: Key,
    pub open_editor: Key,
    pub toggle_overlay: Key,
    pub quit: Key,

    // Editor
    pub delete_box: Key,
    pub relabel_box: Key,
    pub cancel_drag: Key,
    pub save_editor: Key,
    pub cancel_editor: Key,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            accept: Key::Space,
            outcome_first: Key::Left,
            outcome_second: Key::Right,
            toggle_outcome: Key::Tab,
            skip: Key::char('s'),
            undo: Key::char('z'),
            open_editor: Key::char('e'),
            toggle_overlay: Key::char('h'),
            quit: Key::char('q'),

            delete_box: Key::Delete,
            relabel_box: Key::char('r'),
            cancel_drag: Key::Escape,
            save_editor: Key::Enter,
            cancel_editor: Key::char('q'),
        }
    }
}

impl KeyBindings {
    /// Create new keybindings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    fn editor_table(&self) -> [(Key, Command); 5] {
        [
            (self.delete_box, Command::DeleteBox),
            (self.relabel_box, Command::RelabelBox),
            (self.cancel_drag, Command::CancelDrag),
            (self.save_editor, Command::SaveEditor),
            (self.cancel_editor, Command::CancelEditor),
        ]
    }

    fn browse_table(&self) -> [(Key, Command); 9] {
        [
            (self.accept, Command::Accept),
            (self.outcome_first, Command::SelectFirstOutcome),
            (self.outcome_second, Command::SelectSecondOutcome),
            (self.toggle_outcome, Command::ToggleOutcome),
            (self.skip, Command::Skip),
            (self.undo, Command::Undo),
            (self.open_editor, Command::OpenEditor),
            (self.toggle_overlay, Command::ToggleOverlay),
            (self.quit, Command::Quit),
        ]
    }

    /// Get the command for a key press.
    ///
    /// While editing, editor bindings win; the overlay toggle stays available.
    pub fn command_for_key(&self, key: Key, editing: bool) -> Option<Command> {
        if editing {
            self.editor_table()
                .into_iter()
                .find(|(k, _)| *k == key)
                .map(|(_, cmd)| cmd)
                .or_else(|| (key == self.toggle_overlay).then_some(Command::ToggleOverlay))
        } else {
            self.browse_table()
                .into_iter()
                .find(|(k, _)| *k == key)
                .map(|(_, cmd)| cmd)
        }
    }

    /// Find keys bound to more than one command within the same context.
    pub fn conflicts(&self) -> Vec<(Key, Command, Command)> {
        let mut found = Vec::new();
        let editor = self.editor_table();
        let browse = self.browse_table();
        for table in [&editor[..], &browse[..]] {
            for (i, (key, first)) in table.iter().enumerate() {
                if let Some((_, second)) = table[i + 1..].iter().find(|(k, _)| k == key) {
                    found.push((*key, *first, *second));
                }
            }
        }
        found
    }

    /// One-line help listing every binding.
    pub fn help(&self) -> String {
        self.browse_table()
            .iter()
            .chain(self.editor_table().iter())
            .map(|(key, cmd)| format!("{}={}", key, cmd.name()))
            .collect::<Vec<_>>()
            .join("  ")
    }
}
