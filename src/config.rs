//! Console configuration.
//!
//! Behavior switches live in [`ConsoleFlags`]. A [`ConsoleConfig`] bundles
//! them with the prompt and buffer sizes and can be read from TOML:
//!
//! ```toml
//! prompt = "> "
//! line_capacity = 128
//! history_depth = 8
//!
//! insert_mode = true
//! debug = false
//! hide_password = false
//! auto_redraw = true
//! auto_edit = true
//! auto_move = true
//! auto_clear = true
//! auto_history = true
//! ```

use std::fs;
use std::path::Path;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

bitflags! {
    /// Independent behavior switches. They are only ever changed through
    /// explicit setters, never by decoding input.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ConsoleFlags: u16 {
        /// Printable input is inserted; when clear it overwrites.
        const INSERT_MODE   = 1 << 0;
        /// Show a hex dump instead of the line, and dump unknown sequences.
        const DEBUG         = 1 << 1;
        /// Keep the line contents off the screen.
        const HIDE_PASSWORD = 1 << 2;
        /// Redraw after every change to the line.
        const AUTO_REDRAW   = 1 << 3;
        /// Apply printable keys, Backspace and Insert to the line.
        const AUTO_EDIT     = 1 << 4;
        /// Move the caret on arrow, Home/End and Ctrl-A/B/E/F keys.
        const AUTO_MOVE     = 1 << 5;
        /// Clear the line after it was handed to the line handler.
        const AUTO_CLEAR    = 1 << 6;
        /// Record completed lines and recall them with Up/Down.
        const AUTO_HISTORY  = 1 << 7;
    }
}

impl Default for ConsoleFlags {
    fn default() -> Self {
        Self::INSERT_MODE
            | Self::AUTO_REDRAW
            | Self::AUTO_EDIT
            | Self::AUTO_MOVE
            | Self::AUTO_CLEAR
            | Self::AUTO_HISTORY
    }
}

pub const PROMPT_CAPACITY: usize = 31;

/// A prompt string stored inline, at most [`PROMPT_CAPACITY`] bytes.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Prompt {
    buf: [u8; PROMPT_CAPACITY],
    len: u8,
}

impl Prompt {
    /// Copies `s`, silently cutting it at the last character boundary that fits.
    pub fn new(s: &str) -> Self {
        let mut end = s.len().min(PROMPT_CAPACITY);
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        let mut buf = [0; PROMPT_CAPACITY];
        buf[..end].copy_from_slice(&s.as_bytes()[..end]);
        Self {
            buf,
            len: end as u8,
        }
    }

    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len()]).unwrap_or_default()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for Prompt {
    fn default() -> Self {
        Self::new("#")
    }
}

impl core::fmt::Debug for Prompt {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Prompt").field(&self.as_str()).finish()
    }
}

/// Main configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub prompt: String,
    /// Size of the line buffer in bytes, terminator reserve included
    pub line_capacity: usize,
    /// Number of completed lines kept for recall; 0 disables history
    pub history_depth: usize,
    pub insert_mode: bool,
    pub debug: bool,
    pub hide_password: bool,
    pub auto_redraw: bool,
    pub auto_edit: bool,
    pub auto_move: bool,
    pub auto_clear: bool,
    pub auto_history: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        let flags = ConsoleFlags::default();
        Self {
            prompt: "#".to_string(),
            line_capacity: 128,
            history_depth: 8,
            insert_mode: flags.contains(ConsoleFlags::INSERT_MODE),
            debug: flags.contains(ConsoleFlags::DEBUG),
            hide_password: flags.contains(ConsoleFlags::HIDE_PASSWORD),
            auto_redraw: flags.contains(ConsoleFlags::AUTO_REDRAW),
            auto_edit: flags.contains(ConsoleFlags::AUTO_EDIT),
            auto_move: flags.contains(ConsoleFlags::AUTO_MOVE),
            auto_clear: flags.contains(ConsoleFlags::AUTO_CLEAR),
            auto_history: flags.contains(ConsoleFlags::AUTO_HISTORY),
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded console config");
        Ok(config)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        if config.line_capacity < 2 {
            return Err(ConfigError::CapacityTooSmall(config.line_capacity));
        }
        Ok(config)
    }

    pub fn flags(&self) -> ConsoleFlags {
        let mut flags = ConsoleFlags::empty();
        flags.set(ConsoleFlags::INSERT_MODE, self.insert_mode);
        flags.set(ConsoleFlags::DEBUG, self.debug);
        flags.set(ConsoleFlags::HIDE_PASSWORD, self.hide_password);
        flags.set(ConsoleFlags::AUTO_REDRAW, self.auto_redraw);
        flags.set(ConsoleFlags::AUTO_EDIT, self.auto_edit);
        flags.set(ConsoleFlags::AUTO_MOVE, self.auto_move);
        flags.set(ConsoleFlags::AUTO_CLEAR, self.auto_clear);
        flags.set(ConsoleFlags::AUTO_HISTORY, self.auto_history);
        flags
    }

    pub fn prompt(&self) -> Prompt {
        Prompt::new(&self.prompt)
    }
}
