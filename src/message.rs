//! Operator actions for sortbox.
//!
//! Every key press, pointer gesture and prompt answer reaches the session as
//! one [`Action`]; the session turns it into a single state transition.

use std::path::PathBuf;

use crate::keybindings::Command;

/// Actions that can be sent to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // Folder
    /// Open a working folder, tearing down any previous session
    OpenFolder(PathBuf),

    // Browsing
    /// Move the current image into the selected outcome bucket
    Accept,
    /// Select an outcome bucket by index (0 or 1)
    SelectOutcome(usize),
    /// Switch to the other outcome bucket
    ToggleOutcome,
    /// Advance without moving anything
    Skip,
    /// Reverse the most recent history entry
    Undo,
    /// Open the annotation editor on the current image
    OpenEditor,
    /// Show or hide the box overlay
    ToggleOverlay,

    // Editor - pointer
    /// Pointer pressed at a display point
    PointerPress { x: f32, y: f32 },
    /// Pointer moved while pressed
    PointerDrag { x: f32, y: f32 },
    /// Pointer released
    PointerRelease { x: f32, y: f32 },
    /// Abort the box being drawn
    CancelDrag,

    // Editor - boxes
    /// Delete the selected box
    DeleteSelected,
    /// Ask for a new label for the selected box
    EditSelectedLabel,
    /// Answer the open label prompt; `None` means the prompt was cancelled
    SubmitLabel(Option<String>),

    // Editor - closing
    /// Persist the boxes and close the editor
    SaveEditor,
    /// Close the editor, discarding changes
    CancelEditor,

    // Display
    /// The surface the image is fitted into changed size
    Resize { width: u32, height: u32 },
}

impl Action {
    /// Short name used in logs and transition errors.
    pub fn name(&self) -> &'static str {
        match self {
            Action::OpenFolder(_) => "open folder",
            Action::Accept => "accept",
            Action::SelectOutcome(_) => "select outcome",
            Action::ToggleOutcome => "toggle outcome",
            Action::Skip => "skip",
            Action::Undo => "undo",
            Action::OpenEditor => "open editor",
            Action::ToggleOverlay => "toggle overlay",
            Action::PointerPress { .. } => "press",
            Action::PointerDrag { .. } => "drag",
            Action::PointerRelease { .. } => "release",
            Action::CancelDrag => "cancel drag",
            Action::DeleteSelected => "delete box",
            Action::EditSelectedLabel => "relabel box",
            Action::SubmitLabel(_) => "label",
            Action::SaveEditor => "save editor",
            Action::CancelEditor => "cancel editor",
            Action::Resize { .. } => "resize",
        }
    }

    /// Map a key command to its action. `Quit` is handled by the front-end.
    pub fn from_command(command: Command) -> Option<Self> {
        let action = match command {
            Command::Accept => Action::Accept,
            Command::SelectFirstOutcome => Action::SelectOutcome(0),
            Command::SelectSecondOutcome => Action::SelectOutcome(1),
            Command::ToggleOutcome => Action::ToggleOutcome,
            Command::Skip => Action::Skip,
            Command::Undo => Action::Undo,
            Command::OpenEditor => Action::OpenEditor,
            Command::ToggleOverlay => Action::ToggleOverlay,
            Command::DeleteBox => Action::DeleteSelected,
            Command::RelabelBox => Action::EditSelectedLabel,
            Command::CancelDrag => Action::CancelDrag,
            Command::SaveEditor => Action::SaveEditor,
            Command::CancelEditor => Action::CancelEditor,
            Command::Quit => return None,
        };
        Some(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_command() {
        assert_eq!(Action::from_command(Command::Accept), Some(Action::Accept));
        assert_eq!(
            Action::from_command(Command::SelectSecondOutcome),
            Some(Action::SelectOutcome(1))
        );
        assert_eq!(Action::from_command(Command::Quit), None);
    }
}
