//! Editor settings, read from a TOML file. Every field has a default, so a partial
//! (or empty) file is valid.
//!
//! ```toml
//! bytes_per_row = 32
//! start_address = 0xC000
//! show_all_opcodes = true
//! ```

use crate::address::ADDRESS_SPACE_SIZE;
use crate::cellmap::Navigation;
use crate::error::ConfigError;
use log::warn;
use serde::Deserialize;
use std::path::Path;

/// Row widths the hex view can lay out
pub const ALLOWED_BYTES_PER_ROW: [usize; 3] = [8, 16, 32];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Bytes shown per hex row
    pub bytes_per_row: usize,
    /// Bytes moved by a hex page up/down while editing
    pub page_bytes: usize,
    /// Bytes loaded by the hex view
    pub hex_window_length: usize,
    /// Bytes loaded by the disassembly view
    pub disassembly_window_length: usize,
    /// Cells moved by a disassembly page up/down while editing
    pub disassembly_page_cells: usize,
    pub blink_interval_ms: u64,
    /// Render undocumented mnemonics instead of `???`
    pub show_all_opcodes: bool,
    /// Address shown when the app starts
    pub start_address: u16,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            bytes_per_row: 16,
            page_bytes: 256,
            hex_window_length: 256,
            disassembly_window_length: 96,
            disassembly_page_cells: 8,
            blink_interval_ms: 400,
            show_all_opcodes: false,
            start_address: 0x0400,
        }
    }
}

impl EditorConfig {
    /// Load settings from the TOML file at `path`
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the file can't be read or is not valid TOML for this
    /// structure.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Parse settings from TOML text
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] if the text is not valid TOML for this structure.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        Ok(config.normalized())
    }

    /// Replace values the editor can't work with by the nearest usable ones
    #[must_use]
    pub fn normalized(mut self) -> Self {
        let defaults = Self::default();

        if !ALLOWED_BYTES_PER_ROW.contains(&self.bytes_per_row) {
            warn!(
                "bytes_per_row = {} not supported, using {}",
                self.bytes_per_row, defaults.bytes_per_row
            );
            self.bytes_per_row = defaults.bytes_per_row;
        }

        self.hex_window_length = self.hex_window_length.clamp(1, ADDRESS_SPACE_SIZE);
        self.disassembly_window_length = self
            .disassembly_window_length
            .clamp(1, ADDRESS_SPACE_SIZE);
        self.page_bytes = self.page_bytes.max(1);
        self.disassembly_page_cells = self.disassembly_page_cells.max(1);
        self.blink_interval_ms = self.blink_interval_ms.max(50);
        self
    }

    /// Window length for a view navigating the given way
    #[must_use]
    pub const fn window_length(&self, navigation: Navigation) -> usize {
        match navigation {
            Navigation::Rows => self.hex_window_length,
            Navigation::Cells => self.disassembly_window_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let cfg = EditorConfig::from_toml_str("");
        assert_eq!(cfg.ok(), Some(EditorConfig::default()));
    }

    #[test]
    fn test_partial_file() {
        // Arrange
        let text = "bytes_per_row = 32\nstart_address = 0xC000\nshow_all_opcodes = true\n";

        // Act
        let Ok(cfg) = EditorConfig::from_toml_str(text) else {
            panic!("config should parse");
        };

        // Assert
        assert_eq!(cfg.bytes_per_row, 32);
        assert_eq!(cfg.start_address, 0xC000);
        assert!(cfg.show_all_opcodes);
        assert_eq!(cfg.page_bytes, 256);
        assert_eq!(cfg.window_length(Navigation::Cells), 96);
    }

    #[test]
    fn test_unusable_values_are_replaced() {
        let Ok(cfg) = EditorConfig::from_toml_str("bytes_per_row = 12\nhex_window_length = 0")
        else {
            panic!("config should parse");
        };

        assert_eq!(cfg.bytes_per_row, 16);
        assert_eq!(cfg.window_length(Navigation::Rows), 1);
    }

    #[test]
    fn test_parse_and_io_errors() {
        assert!(matches!(
            EditorConfig::from_toml_str("bytes_per_row = \"wide\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            EditorConfig::load("/nonexistent/hexpoke.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
