//! # `hexpokelib`
//!
//! `hexpokelib` is the editor core behind `hexpoke`: a nibble-level editor for the
//! live memory of a 64K device, with a plain hex view and an instruction-aware 6502
//! disassembly view.
//!
//! The library provides:
//! - A two-buffer edit model (via [`EditBuffer`]) with per-nibble revert.
//! - Cell maps that make the cursor follow instruction boundaries (via [`CellLayout`]).
//! - Cursor, selection, clipboard and commit handling (via [`MemoryEditor`]).
//! - The Browse/Edit session controller with its request/complete protocol for the
//!   remote device (via [`EditorSession`]).
//! - A 6502 disassembler and assembler ([`mos6502::Mos6502`]).
//!
//! ## Example
//!
//! ```
//! use hexpokelib::{EditorConfig, EditorSession, HexLayout, Key, KeyEvent, SimulatedDevice, drive};
//!
//! let mut device = SimulatedDevice::new();
//! let mut session = EditorSession::new(HexLayout, &EditorConfig::default());
//!
//! session.enter_edit_mode();
//! drive(&mut session, &mut device);
//!
//! session.handle_key(&KeyEvent::plain(Key::Char('E')));
//! session.handle_key(&KeyEvent::plain(Key::Char('A')));
//! session.exit_edit_mode(true);
//! drive(&mut session, &mut device);
//!
//! assert_eq!(device.ram()[0x0400], 0xEA);
//! ```

#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![allow(clippy::must_use_candidate, clippy::missing_panics_doc)]

mod address;
mod buffer;
mod cellmap;
pub mod clipboard;
mod commit;
mod config;
mod cursor;
mod device;
mod editor;
mod error;
mod input;
pub mod locations;
pub mod mos6502;
mod session;
mod tabs;

// Public APIs
pub use address::{ADDRESS_SPACE_SIZE, AddressRange, MemoryWindow, validate_address};
pub use buffer::{Change, EditBuffer, Nibble};
pub use cellmap::{Cell, CellLayout, CellMap, DisassemblyLayout, HexLayout, Navigation};
pub use commit::{CommitRange, plan_commit};
pub use config::{ALLOWED_BYTES_PER_ROW, EditorConfig};
pub use cursor::{ByteSpan, Cursor, Geometry, Motion, Selection, hit_test};
pub use device::{Assembler, DeviceMemory, Disassembler, Instruction, SimulatedDevice};
pub use editor::{BlinkTimer, ByteView, MemoryEditor, RowView};
pub use error::{ApiError, AssembleError, AssembleErrorKind, ConfigError};
pub use input::{Key, KeyEvent, Modifiers, PointerEvent};
pub use session::{EditorSession, Mode, ReadPurpose, RemoteRequest, drive};
pub use tabs::{TabLifecycle, TabRegistry};
