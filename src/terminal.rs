//! Line-based operator input.
//!
//! The terminal front-end reads one event per line: a key name looked up in
//! the keybindings, a pointer gesture, a label answer, or a session command.

use std::path::PathBuf;

use crate::keybindings::{Command, Key, KeyBindings};
use crate::message::Action;

/// One parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// Forward to the session
    Action(Action),
    /// Leave the program
    Quit,
    /// Print the key help
    Help,
    /// Blank line
    Nothing,
}

/// Why a line could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("'{0}' is not bound to anything here (type 'help')")]
    Unbound(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

/// Parse one line of operator input.
///
/// `editing` selects which keybindings apply, since editor keys may shadow
/// browsing keys.
pub fn parse_line(line: &str, bindings: &KeyBindings, editing: bool) -> Result<Input, InputError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let input = match word.to_lowercase().as_str() {
        "" => Input::Nothing,
        "help" | "?" => Input::Help,
        "press" => pointer(rest, |x, y| Action::PointerPress { x, y }, "press X Y")?,
        "drag" => pointer(rest, |x, y| Action::PointerDrag { x, y }, "drag X Y")?,
        "release" => pointer(rest, |x, y| Action::PointerRelease { x, y }, "release X Y")?,
        "label" => Input::Action(Action::SubmitLabel(
            (!rest.is_empty()).then(|| rest.to_string()),
        )),
        "resize" => {
            let (width, height) = pair::<u32>(rest).ok_or(InputError::Usage("resize W H"))?;
            Input::Action(Action::Resize { width, height })
        }
        "open" if !rest.is_empty() => Input::Action(Action::OpenFolder(PathBuf::from(rest))),
        "open" => return Err(InputError::Usage("open DIR")),
        _ if !rest.is_empty() => return Err(InputError::Unbound(line.to_string())),
        _ => {
            let key: Key = word
                .parse()
                .map_err(|_| InputError::Unbound(word.to_string()))?;
            match bindings.command_for_key(key, editing) {
                Some(Command::Quit) => Input::Quit,
                Some(command) => Action::from_command(command)
                    .map(Input::Action)
                    .unwrap_or(Input::Nothing),
                None => return Err(InputError::Unbound(word.to_string())),
            }
        }
    };
    Ok(input)
}

fn pointer(
    rest: &str,
    make: impl FnOnce(f32, f32) -> Action,
    usage: &'static str,
) -> Result<Input, InputError> {
    let (x, y) = pair::<f32>(rest).ok_or(InputError::Usage(usage))?;
    Ok(Input::Action(make(x, y)))
}

fn pair<T: std::str::FromStr>(text: &str) -> Option<(T, T)> {
    let mut parts = text.split_whitespace();
    let a = parts.next()?.parse().ok()?;
    let b = parts.next()?.parse().ok()?;
    parts.next().is_none().then_some((a, b))
}
