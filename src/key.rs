/// Key codes representing individual keys on the keyboard.
///
/// This enum provides a platform-agnostic representation of keys.
/// Hosts should map their platform-specific key events to these codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// A character key. Text insertion itself is left to the host.
    Char(char),
    Up,
    Down,
    Left,
    Right,
    /// The Enter/Return key. With SHIFT held it inserts a soft line break.
    Enter,
    /// The Backspace key.
    Backspace,
    /// The Tab key. With SHIFT held it outdents a list item.
    Tab,
    Esc,
}

bitflags::bitflags! {
    /// Keyboard modifier flags.
    ///
    /// These can be combined to represent multiple modifiers held simultaneously.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
        const META  = 0b1000;
    }
}

/// A key press event with optional modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key that was pressed.
    pub code: KeyCode,
    /// Modifier keys held during the key press.
    pub mods: Modifiers,
}

impl KeyEvent {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            mods: Modifiers::empty(),
        }
    }

    pub fn with_mods(code: KeyCode, mods: Modifiers) -> Self {
        Self { code, mods }
    }

    pub fn shift(&self) -> bool {
        self.mods.contains(Modifiers::SHIFT)
    }
}

/// Input events that can be processed by the editor.
///
/// Key presses go through the navigation controller; `Input` carries the
/// serialized state of an editable surface after the host applied a native
/// edit (typing, paste, IME composition).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    /// The surface's markup after a native edit.
    Input(String),
}
