//! # VT100 escape-sequence codec
//!
//! This module maps between named terminal keys, actions and colors and the
//! exact ANSI/VT100 byte sequences that travel over the wire. Only a small,
//! fixed set of sequences is understood; anything else is ignored.
//!
//! ## Decoding
//!
//! Inbound runs that begin with ESC are matched byte-for-byte against
//! [`KEY_SEQUENCES`]. A match yields a [`KeyCode`] and fires the callback
//! attached to that key, if any:
//!
//! ```rust
//! use ushell::escape::{EscapeCodec, KeyCode};
//!
//! let mut codec = EscapeCodec::new();
//! assert_eq!(codec.decode(b"\x1B[A"), Ok(Some(KeyCode::Up)));
//! assert_eq!(codec.decode(b"\x1B[Z"), Ok(None));
//! ```
//!
//! ## Encoding
//!
//! Outbound sequences are handed to a caller-supplied write primitive. A
//! failing write surfaces as [`Error::Port`]:
//!
//! ```rust
//! use ushell::escape::{Color, EscapeCodec};
//!
//! let mut codec = EscapeCodec::new();
//! let mut sent = heapless::String::<16>::new();
//! codec
//!     .set_font_color(Color::Red, |seq| sent.push_str(seq))
//!     .unwrap();
//! assert_eq!(sent.as_str(), "\x1B[31m");
//! assert_eq!(codec.font_color(), Color::Red);
//! ```

#![deny(unsafe_code)]

use crate::error::Error;

/// ASCII escape character (0x1B).
pub const ESC: u8 = 0x1B;

/// Shortest inbound key sequence, ESC included.
pub const MIN_SEQUENCE_LEN: usize = 3;

/// Longest inbound key sequence, ESC included.
pub const MAX_SEQUENCE_LEN: usize = 4;

/// Keys recognized on the inbound side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// Arrow up, `ESC [ A`.
    Up,
    /// Arrow down, `ESC [ B`.
    Down,
    /// Arrow right, `ESC [ C`.
    Right,
    /// Arrow left, `ESC [ D`.
    Left,
    /// Delete, `ESC [ 3 ~`.
    Delete,
    /// Home, `ESC [ H`.
    Home,
    /// End, `ESC [ F`.
    End,
    /// Page up, `ESC [ 5 ~`.
    PageUp,
    /// Page down, `ESC [ 6 ~`.
    PageDown,
}

impl KeyCode {
    /// Number of distinct key codes.
    pub const COUNT: usize = 9;

    fn index(self) -> usize {
        self as usize
    }
}

/// Terminal colors for foreground and background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    /// Black
    Black,
    /// Red
    Red,
    /// Green
    Green,
    /// Yellow
    Yellow,
    /// Blue
    Blue,
    /// Magenta
    Magenta,
    /// Cyan
    Cyan,
    /// White
    White,
    /// The terminal's own default color.
    #[default]
    Default,
}

/// Terminal control actions on the outbound side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Erase the whole screen and home the cursor.
    ClearScreen,
    /// Erase the current line and return the carriage.
    ClearLine,
    /// Visually remove the character left of the cursor.
    DeleteChar,
    /// Move the cursor one row up.
    CursorUp,
    /// Move the cursor one row down.
    CursorDown,
    /// Move the cursor one column right.
    CursorRight,
    /// Move the cursor one column left.
    CursorLeft,
    /// Hide the cursor.
    CursorHide,
    /// Show the cursor.
    CursorShow,
}

/// Inbound key table.
pub static KEY_SEQUENCES: [(&[u8], KeyCode); KeyCode::COUNT] = [
    (b"\x1B[A", KeyCode::Up),
    (b"\x1B[B", KeyCode::Down),
    (b"\x1B[C", KeyCode::Right),
    (b"\x1B[D", KeyCode::Left),
    (b"\x1B[3~", KeyCode::Delete),
    (b"\x1B[H", KeyCode::Home),
    (b"\x1B[F", KeyCode::End),
    (b"\x1B[5~", KeyCode::PageUp),
    (b"\x1B[6~", KeyCode::PageDown),
];

static FONT_COLORS: [&str; 9] = [
    "\x1B[30m", "\x1B[31m", "\x1B[32m", "\x1B[33m", "\x1B[34m", "\x1B[35m", "\x1B[36m",
    "\x1B[37m", "\x1B[39m",
];

static BACKGROUND_COLORS: [&str; 9] = [
    "\x1B[40m", "\x1B[41m", "\x1B[42m", "\x1B[43m", "\x1B[44m", "\x1B[45m", "\x1B[46m",
    "\x1B[47m", "\x1B[49m",
];

impl Color {
    /// Sequence selecting this color for the font.
    pub fn font_sequence(self) -> &'static str {
        FONT_COLORS[self as usize]
    }

    /// Sequence selecting this color for the background.
    pub fn background_sequence(self) -> &'static str {
        BACKGROUND_COLORS[self as usize]
    }
}

impl Action {
    /// Exact byte sequence emitted for this action.
    pub fn sequence(self) -> &'static str {
        match self {
            Action::ClearScreen => "\x1B[2J\x1B[1;1H",
            Action::ClearLine => "\x1B[2K\r",
            Action::DeleteChar => "\x08 \x08",
            Action::CursorUp => "\x1B[A",
            Action::CursorDown => "\x1B[B",
            Action::CursorRight => "\x1B[C",
            Action::CursorLeft => "\x1B[D",
            Action::CursorHide => "\x1B[?25l",
            Action::CursorShow => "\x1B[?25h",
        }
    }
}

/// Outcome of matching a partially received sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceMatch {
    /// The buffer is exactly a known key sequence.
    Complete(KeyCode),
    /// The buffer is a strict prefix of at least one known sequence.
    Partial,
    /// The buffer cannot become a known sequence.
    Unknown,
}

/// Classify a buffered run that starts with ESC.
pub fn match_sequence(seq: &[u8]) -> SequenceMatch {
    let mut partial = false;
    for (bytes, key) in KEY_SEQUENCES.iter() {
        if *bytes == seq {
            return SequenceMatch::Complete(*key);
        }
        if bytes.len() > seq.len() && bytes.starts_with(seq) {
            partial = true;
        }
    }
    if partial {
        SequenceMatch::Partial
    } else {
        SequenceMatch::Unknown
    }
}

/// Callback fired when its key is decoded.
pub type KeyCallback = fn(&mut EscapeCodec, KeyCode);

/// Stateful escape codec.
///
/// The tables themselves are static; the codec only remembers the colors last
/// set, the cursor visibility, and the per-key callbacks.
#[derive(Debug, Clone)]
pub struct EscapeCodec {
    font: Color,
    background: Color,
    cursor_visible: bool,
    callbacks: [Option<KeyCallback>; KeyCode::COUNT],
}

impl Default for EscapeCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl EscapeCodec {
    /// Create a codec with default colors, a visible cursor and no callbacks.
    pub const fn new() -> Self {
        Self {
            font: Color::Default,
            background: Color::Default,
            cursor_visible: true,
            callbacks: [None; KeyCode::COUNT],
        }
    }

    /// Attach `callback` to `key`, replacing any previous one.
    pub fn attach(&mut self, key: KeyCode, callback: KeyCallback) {
        self.callbacks[key.index()] = Some(callback);
    }

    /// Detach the callback of `key`. Detaching an empty slot is a no-op.
    pub fn detach(&mut self, key: KeyCode) {
        self.callbacks[key.index()] = None;
    }

    /// Whether a callback is attached to `key`.
    pub fn is_attached(&self, key: KeyCode) -> bool {
        self.callbacks[key.index()].is_some()
    }

    /// Decode a complete inbound sequence, ESC included.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(key))` - the sequence is a known key; its callback, if any,
    ///   has been invoked
    /// * `Ok(None)` - the sequence is not in the key table
    /// * `Err(Error::InvalidArguments)` - `seq` is empty
    pub fn decode(&mut self, seq: &[u8]) -> Result<Option<KeyCode>, Error> {
        if seq.is_empty() {
            return Err(Error::InvalidArguments);
        }
        if !(MIN_SEQUENCE_LEN..=MAX_SEQUENCE_LEN).contains(&seq.len()) {
            return Ok(None);
        }

        let key = match match_sequence(seq) {
            SequenceMatch::Complete(key) => key,
            SequenceMatch::Partial | SequenceMatch::Unknown => return Ok(None),
        };

        if let Some(callback) = self.callbacks[key.index()] {
            callback(self, key);
        }
        Ok(Some(key))
    }

    /// Emit the sequence for `color` as font color.
    ///
    /// The remembered font color only changes when the write succeeds.
    pub fn set_font_color<F, E>(&mut self, color: Color, write: F) -> Result<(), Error>
    where
        F: FnMut(&str) -> Result<(), E>,
    {
        emit(color.font_sequence(), write)?;
        self.font = color;
        Ok(())
    }

    /// Emit the sequence for `color` as background color.
    pub fn set_background_color<F, E>(&mut self, color: Color, write: F) -> Result<(), Error>
    where
        F: FnMut(&str) -> Result<(), E>,
    {
        emit(color.background_sequence(), write)?;
        self.background = color;
        Ok(())
    }

    /// Emit the sequence for a terminal action.
    pub fn action<F, E>(&mut self, action: Action, write: F) -> Result<(), Error>
    where
        F: FnMut(&str) -> Result<(), E>,
    {
        emit(action.sequence(), write)?;
        match action {
            Action::CursorHide => self.cursor_visible = false,
            Action::CursorShow => self.cursor_visible = true,
            _ => {}
        }
        Ok(())
    }

    /// Font color last set through this codec.
    pub fn font_color(&self) -> Color {
        self.font
    }

    /// Background color last set through this codec.
    pub fn background_color(&self) -> Color {
        self.background
    }

    /// Whether the cursor was last shown rather than hidden.
    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }
}

fn emit<F, E>(sequence: &str, mut write: F) -> Result<(), Error>
where
    F: FnMut(&str) -> Result<(), E>,
{
    write(sequence).map_err(|_| Error::Port)
}

#[cfg(feature = "defmt")]
impl defmt::Format for KeyCode {
    fn format(&self, f: defmt::Formatter) {
        match self {
            KeyCode::Up => defmt::write!(f, "Up"),
            KeyCode::Down => defmt::write!(f, "Down"),
            KeyCode::Right => defmt::write!(f, "Right"),
            KeyCode::Left => defmt::write!(f, "Left"),
            KeyCode::Delete => defmt::write!(f, "Delete"),
            KeyCode::Home => defmt::write!(f, "Home"),
            KeyCode::End => defmt::write!(f, "End"),
            KeyCode::PageUp => defmt::write!(f, "PageUp"),
            KeyCode::PageDown => defmt::write!(f, "PageDown"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Color {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Color::Black => defmt::write!(f, "Black"),
            Color::Red => defmt::write!(f, "Red"),
            Color::Green => defmt::write!(f, "Green"),
            Color::Yellow => defmt::write!(f, "Yellow"),
            Color::Blue => defmt::write!(f, "Blue"),
            Color::Magenta => defmt::write!(f, "Magenta"),
            Color::Cyan => defmt::write!(f, "Cyan"),
            Color::White => defmt::write!(f, "White"),
            Color::Default => defmt::write!(f, "Default"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Action {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Action::ClearScreen => defmt::write!(f, "ClearScreen"),
            Action::ClearLine => defmt::write!(f, "ClearLine"),
            Action::DeleteChar => defmt::write!(f, "DeleteChar"),
            Action::CursorUp => defmt::write!(f, "CursorUp"),
            Action::CursorDown => defmt::write!(f, "CursorDown"),
            Action::CursorRight => defmt::write!(f, "CursorRight"),
            Action::CursorLeft => defmt::write!(f, "CursorLeft"),
            Action::CursorHide => defmt::write!(f, "CursorHide"),
            Action::CursorShow => defmt::write!(f, "CursorShow"),
        }
    }
}

#[cfg(test)]
mod tests;
