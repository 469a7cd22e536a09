//! Keyboard navigation state machine.
//!
//! Tracks whether the candidate panel is open and which row has focus, with
//! wrap-around arrow movement over the display window. An IME composition
//! guard suppresses every transition while a multi-keystroke composition is
//! in progress, so pinyin-input keystrokes are not misread as navigation
//! commands.

use serde::{Deserialize, Serialize};

/// Keys the engine reacts to. The embedding layer maps its toolkit's key
/// events onto this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    Enter,
    Backspace,
    /// A digit key, `1..=9`. With Alt held these are the candidate hotkeys.
    Digit(u8),
    Char(char),
}

/// A key press with its modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub alt: bool,
}

impl KeyEvent {
    pub fn plain(key: Key) -> Self {
        Self { key, alt: false }
    }

    pub fn alt(key: Key) -> Self {
        Self { key, alt: true }
    }
}

/// Outcome of dispatching a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleResult {
    Handled,
    Ignored,
}

/// Panel open/close and focus state.
#[derive(Debug, Clone, Copy, Default)]
pub struct NavigationState {
    open: bool,
    focus: Option<usize>,
    composing: bool,
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Focused row within the display window, `None` when the window is
    /// empty or the panel is closed.
    pub fn focus(&self) -> Option<usize> {
        if self.open { self.focus } else { None }
    }

    pub fn is_composing(&self) -> bool {
        self.composing
    }

    pub fn begin_composition(&mut self) {
        self.composing = true;
    }

    pub fn end_composition(&mut self) {
        self.composing = false;
    }

    /// Open the panel with focus on the first row (or no focus when the
    /// window is empty).
    pub fn open(&mut self, window_len: usize) {
        self.open = true;
        self.reset_focus(window_len);
    }

    pub fn close(&mut self) {
        self.open = false;
        self.focus = None;
    }

    /// Recompute focus after the display window changed.
    pub fn reset_focus(&mut self, window_len: usize) {
        self.focus = if window_len > 0 { Some(0) } else { None };
    }

    /// Move focus down one row, wrapping at the end.
    pub fn move_down(&mut self, window_len: usize) {
        if window_len == 0 {
            self.focus = None;
            return;
        }
        self.focus = Some(match self.focus {
            Some(i) => (i + 1) % window_len,
            None => 0,
        });
    }

    /// Move focus up one row, wrapping at the start.
    pub fn move_up(&mut self, window_len: usize) {
        if window_len == 0 {
            self.focus = None;
            return;
        }
        self.focus = Some(match self.focus {
            Some(i) => (i + window_len - 1) % window_len,
            None => 0,
        });
    }
}
