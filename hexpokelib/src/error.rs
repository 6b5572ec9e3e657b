//! The `error` module defines the errors that can surface from the editor core.
//! There are three sources of them:
//! 1. The device link, reported by a [`crate::DeviceMemory`] implementation as [`ApiError`].
//! 2. The assembler used when pasting source text, reported as [`AssembleError`]
//!    (what went wrong via [`AssembleErrorKind`] plus the line number).
//! 3. Loading the editor configuration, reported as [`ConfigError`].
//!
//! Address and cursor problems are never errors: they are clamped on the way in.

use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request could not be delivered or the reply was unusable
    Transport(String),
    /// The requested range does not fit into the 64K address space
    OutOfRange { address: u16, length: usize },
    /// The device answered, but refused the request
    Rejected(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "Device communication failed: {msg}"),
            Self::OutOfRange { address, length } => {
                write!(
                    f,
                    "Range ${address:04X} + {length} bytes exceeds the address space"
                )
            }
            Self::Rejected(msg) => write!(f, "Device rejected the request: {msg}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssembleError {
    /// Error at the given 1-based source line
    Line(AssembleErrorKind, usize),
    /// Source contained no statements
    Empty,
}

impl AssembleError {
    /// Line the error was found at, if it belongs to one
    #[must_use]
    pub const fn line(&self) -> Option<usize> {
        match self {
            Self::Line(_, line) => Some(*line),
            Self::Empty => None,
        }
    }
}

impl fmt::Display for AssembleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line(kind, line) => write!(f, "Assembly failed at line {line}: {kind}"),
            Self::Empty => write!(f, "Nothing to assemble"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssembleErrorKind {
    /// Mnemonic is not a 6502 instruction or a known directive
    UnknownMnemonic(String),
    /// Operand text could not be parsed
    InvalidOperand(String),
    /// Instruction exists, but not with this addressing mode
    UnsupportedAddressingMode(String),
    /// Label referenced but never defined
    UndefinedLabel(String),
    /// Label defined twice
    DuplicateLabel(String),
    /// Branch target further than -128..=127 bytes away
    BranchOutOfRange(u16),
    /// Numeric value does not fit into the operand
    ValueTooLarge(u32),
}

impl fmt::Display for AssembleErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownMnemonic(m) => write!(f, "Unknown mnemonic '{m}'"),
            Self::InvalidOperand(op) => write!(f, "Invalid operand '{op}'"),
            Self::UnsupportedAddressingMode(m) => {
                write!(f, "Addressing mode not supported by '{m}'")
            }
            Self::UndefinedLabel(label) => write!(f, "Undefined label '{label}'"),
            Self::DuplicateLabel(label) => write!(f, "Label '{label}' defined twice"),
            Self::BranchOutOfRange(target) => {
                write!(f, "Branch target ${target:04X} is out of range")
            }
            Self::ValueTooLarge(value) => write!(f, "Value ${value:X} is too large"),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "Could not read config file: {err}"),
            Self::Parse(err) => write!(f, "Could not parse config file:\n{err}"),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse(err)
    }
}

impl Error for ApiError {}
impl Error for AssembleError {}
impl Error for AssembleErrorKind {}
impl Error for ConfigError {}
