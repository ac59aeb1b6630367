//! Events produced by the canvas surface and keyboard chords.

use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::surface::ObjectHandle;

/// Held modifier keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Keys the engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Delete,
    Backspace,
    Character(char),
}

/// A key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Press `key` with no modifiers.
    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::default())
    }

    /// Press `c` with the platform command modifier.
    pub fn command(c: char) -> Self {
        Self::new(
            Key::Character(c),
            Modifiers {
                ctrl: true,
                ..Modifiers::default()
            },
        )
    }

    /// Press `c` with command and shift.
    pub fn command_shift(c: char) -> Self {
        Self::new(
            Key::Character(c),
            Modifiers {
                ctrl: true,
                shift: true,
                ..Modifiers::default()
            },
        )
    }

    /// Resolve this press against [`KEY_BINDINGS`].
    pub fn to_command(&self) -> Option<KeyCommand> {
        KEY_BINDINGS
            .iter()
            .find(|binding| binding.accepts(self))
            .map(|binding| binding.command)
    }
}

/// Discrete commands bound to keyboard chords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    DeleteSelected,
    Undo,
    Redo,
}

/// Everything the surface reports to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SurfaceEvent {
    PointerDown {
        position: Point,
        /// Topmost object under the pointer, if selection is enabled.
        target: Option<ObjectHandle>,
    },
    PointerMove {
        position: Point,
    },
    PointerUp {
        position: Point,
    },
    /// A transform or edit on `target` finalized.
    ObjectModified {
        target: ObjectHandle,
    },
    /// The native pen finished a stroke and added it as `target`.
    PathCreated {
        target: ObjectHandle,
    },
    TextEditing {
        target: ObjectHandle,
        active: bool,
    },
    Key(KeyEvent),
}

/// One chord in the binding table.
#[derive(Debug, Clone, Copy)]
pub struct KeyBinding {
    pub key: Key,
    /// Ctrl on most platforms, Cmd on macOS.
    pub with_command: bool,
    pub with_shift: bool,
    pub command: KeyCommand,
}

impl KeyBinding {
    const fn plain(key: Key, command: KeyCommand) -> Self {
        Self {
            key,
            with_command: false,
            with_shift: false,
            command,
        }
    }

    const fn chord(c: char, with_shift: bool, command: KeyCommand) -> Self {
        Self {
            key: Key::Character(c),
            with_command: true,
            with_shift,
            command,
        }
    }

    fn accepts(&self, press: &KeyEvent) -> bool {
        let same_key = match (self.key, press.key) {
            (Key::Character(a), Key::Character(b)) => a.eq_ignore_ascii_case(&b),
            (a, b) => a == b,
        };
        same_key
            && press.modifiers.command() == self.with_command
            && press.modifiers.shift == self.with_shift
    }

    /// Human-readable chord, e.g. `Ctrl+Shift+Z`.
    pub fn label(&self) -> String {
        let key = match self.key {
            Key::Delete => "Delete".to_owned(),
            Key::Backspace => "Backspace".to_owned(),
            Key::Character(c) => c.to_ascii_uppercase().to_string(),
        };
        [
            self.with_command.then_some("Ctrl"),
            self.with_shift.then_some("Shift"),
            Some(key.as_str()),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join("+")
    }
}

/// Every chord the engine binds.
pub const KEY_BINDINGS: &[KeyBinding] = &[
    KeyBinding::plain(Key::Delete, KeyCommand::DeleteSelected),
    KeyBinding::plain(Key::Backspace, KeyCommand::DeleteSelected),
    KeyBinding::chord('z', false, KeyCommand::Undo),
    KeyBinding::chord('z', true, KeyCommand::Redo),
    KeyBinding::chord('y', false, KeyCommand::Redo),
];
