//! The editing engine shared by the hex and the disassembly view.
//!
//! [`MemoryEditor`] owns the [`EditBuffer`], the [`CellMap`] derived from it and the
//! [`Cursor`]. The [`CellLayout`] strategy is the only thing that differs between the
//! two views. After every modification a rebuilding layout re-derives the cell map from
//! the current bytes and the cursor is placed again by buffer offset, so it lands on
//! the intended byte even when instruction boundaries moved.

use crate::buffer::{Change, EditBuffer, Nibble};
use crate::cellmap::{CellLayout, CellMap, Navigation};
use crate::clipboard;
use crate::config::EditorConfig;
use crate::cursor::{Cursor, Geometry, Motion};
use crate::error::AssembleError;
use crate::input::{Key, KeyEvent, PointerEvent};
use log::debug;

/// One byte as the renderer should draw it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteView {
    /// Projected byte index, `nibble index / 2`
    pub position: usize,
    pub value: u8,
    pub modified: bool,
    /// Selection state of the high and low nibble
    pub selected: [bool; 2],
    /// Nibble under the cursor, if the cursor is on this byte
    pub cursor: Option<Nibble>,
}

/// One rendered line: a hex row or a disassembled instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub address: u16,
    pub bytes: Vec<ByteView>,
    /// ASCII column of a hex row, assembly text of an instruction
    pub text: String,
}

/// Fixed-interval on/off toggle for the edit cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkTimer {
    interval_ms: u64,
    elapsed_ms: u64,
    visible: bool,
}

impl BlinkTimer {
    #[must_use]
    pub const fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms: if interval_ms == 0 { 1 } else { interval_ms },
            elapsed_ms: 0,
            visible: true,
        }
    }

    /// Show the cursor and restart the interval
    pub const fn reset(&mut self) {
        self.elapsed_ms = 0;
        self.visible = true;
    }

    /// Advance by `dt_ms`. Returns `true` if the visibility changed.
    pub const fn tick(&mut self, dt_ms: u64) -> bool {
        self.elapsed_ms += dt_ms;
        let toggles = self.elapsed_ms / self.interval_ms;
        self.elapsed_ms %= self.interval_ms;

        let changed = toggles % 2 == 1;
        if changed {
            self.visible = !self.visible;
        }
        changed
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub const fn interval_ms(&self) -> u64 {
        self.interval_ms
    }
}

#[derive(Debug, Clone)]
pub struct MemoryEditor<L> {
    layout: L,
    buffer: EditBuffer,
    map: CellMap,
    cursor: Cursor,
    bytes_per_row: usize,
    page_bytes: usize,
    page_cells: usize,
    /// Render undocumented mnemonics instead of `???`
    show_all_opcodes: bool,
}

impl<L: CellLayout> MemoryEditor<L> {
    pub fn new(layout: L, config: &EditorConfig) -> Self {
        Self {
            layout,
            buffer: EditBuffer::default(),
            map: CellMap::default(),
            cursor: Cursor::default(),
            bytes_per_row: config.bytes_per_row.max(1),
            page_bytes: config.page_bytes,
            page_cells: config.disassembly_page_cells,
            show_all_opcodes: config.show_all_opcodes,
        }
    }

    /// Take a fresh snapshot. Cursor and selection are reset.
    pub fn load(&mut self, bytes: &[u8], base_address: u16) {
        self.buffer.load(bytes, base_address);
        self.map = self.layout.build(self.buffer.current(), base_address);
        self.cursor.reset();
        debug!(
            "Loaded {} bytes at ${base_address:04X} ({} cells)",
            bytes.len(),
            self.map.cells().len()
        );
    }

    pub const fn layout(&self) -> &L {
        &self.layout
    }

    pub const fn buffer(&self) -> &EditBuffer {
        &self.buffer
    }

    pub const fn map(&self) -> &CellMap {
        &self.map
    }

    pub const fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn navigation(&self) -> Navigation {
        self.layout.navigation()
    }

    pub const fn bytes_per_row(&self) -> usize {
        self.bytes_per_row
    }

    pub const fn set_bytes_per_row(&mut self, bytes_per_row: usize) {
        self.bytes_per_row = if bytes_per_row == 0 { 1 } else { bytes_per_row };
    }

    pub const fn show_all_opcodes(&self) -> bool {
        self.show_all_opcodes
    }

    pub const fn set_show_all_opcodes(&mut self, show: bool) {
        self.show_all_opcodes = show;
    }

    /// Absolute address of the byte under the cursor
    #[allow(clippy::cast_possible_truncation)]
    pub fn cursor_address(&self) -> Option<u16> {
        self.map
            .buffer_offset(self.cursor.byte())
            .map(|o| self.buffer.base_address().wrapping_add(o as u16))
    }

    pub fn is_modified(&self) -> bool {
        self.buffer.is_modified()
    }

    pub fn changes(&self) -> Vec<Change> {
        self.buffer.changes()
    }

    /// Accept the current bytes as the new baseline
    pub fn commit(&mut self) {
        self.buffer.commit();
    }

    /// Drop all edits and return to the loaded bytes
    pub fn discard(&mut self) {
        self.buffer.discard();
        self.cursor.clear_selection();
        self.rebuild();
    }

    /// Re-derive the cell map from the current bytes
    pub fn rebuild(&mut self) {
        self.map = self
            .layout
            .build(self.buffer.current(), self.buffer.base_address());
        self.cursor.clamp(self.map.max_nibble());
    }

    /// Buffer position behind nibble `index`
    #[allow(clippy::cast_possible_truncation)]
    fn locate(&self, index: usize) -> Option<(usize, Nibble)> {
        self.map
            .buffer_offset(index / 2)
            .map(|offset| (offset, (index % 2) as Nibble))
    }

    /// Rebuild if the layout needs it, then put the cursor on `target`
    fn finish_edit(&mut self, target: Option<(usize, Nibble)>) {
        if self.layout.rebuilds_on_edit() {
            self.map = self
                .layout
                .build(self.buffer.current(), self.buffer.base_address());
        }

        let max = self.map.max_nibble();
        let index = target.and_then(|(offset, nibble)| {
            self.map
                .position_of(offset)
                .map(|p| p * 2 + usize::from(nibble))
        });

        if let Some(index) = index {
            self.cursor.set_index(index, max);
        }
        self.cursor.clamp(max);
    }

    pub fn move_cursor(&mut self, motion: Motion, extend: bool) -> bool {
        let geo = Geometry {
            map: &self.map,
            navigation: self.layout.navigation(),
            bytes_per_row: self.bytes_per_row,
            page_bytes: self.page_bytes,
            page_cells: self.page_cells,
        };
        self.cursor.apply(motion, extend, &geo)
    }

    /// Enter a hex digit. Fills the whole selection if there is one, otherwise writes
    /// the nibble under the cursor and advances.
    pub fn type_digit(&mut self, digit: u8) -> bool {
        let Some(max) = self.map.max_nibble() else {
            return false;
        };

        let end = if let Some(range) = self.cursor.selection().range() {
            for index in range.clone() {
                if let Some((offset, nibble)) = self.locate(index) {
                    self.buffer.set_nibble(offset, nibble, digit);
                }
            }
            self.cursor.clear_selection();
            *range.end()
        } else {
            let index = self.cursor.index();
            if let Some((offset, nibble)) = self.locate(index) {
                self.buffer.set_nibble(offset, nibble, digit);
            }
            (index + 1).min(max)
        };

        let target = self.locate(end);
        self.finish_edit(target);
        true
    }

    /// Step back one nibble and restore it from the original
    pub fn backspace(&mut self) -> bool {
        let index = self.cursor.index();
        if index == 0 {
            return true;
        }
        self.cursor.clear_selection();

        let target = self.locate(index - 1);
        if let Some((offset, nibble)) = target {
            self.buffer.revert_nibble(offset, nibble);
        }
        self.finish_edit(target);
        true
    }

    /// Restore the whole byte under the cursor
    pub fn delete(&mut self) -> bool {
        let target = self.locate(self.cursor.index());
        if let Some((offset, _)) = target
            && self.buffer.revert_byte(offset)
        {
            self.finish_edit(target);
        }
        true
    }

    pub fn select_all(&mut self) {
        self.cursor.select_all(self.map.max_nibble());
    }

    /// Drop the selection. Returns `true` if there was one.
    pub fn clear_selection(&mut self) -> bool {
        let active = self.cursor.selection().active;
        self.cursor.clear_selection();
        active
    }

    /// Hex text of the selected bytes, or of the byte under the cursor
    pub fn copy_text(&self) -> Option<String> {
        if self.map.is_empty() {
            return None;
        }

        let byte = self.cursor.byte();
        let range = self
            .cursor
            .selection()
            .byte_range()
            .unwrap_or(byte..=byte);

        let bytes: Vec<u8> = range
            .filter_map(|p| self.map.buffer_offset(p))
            .filter_map(|o| self.buffer.byte(o))
            .collect();
        Some(clipboard::encode(&bytes))
    }

    /// Overwrite projected bytes from `start`. Returns number of bytes written.
    fn write_projected(&mut self, start: usize, bytes: &[u8]) -> usize {
        let mut count = 0;
        for (i, &b) in bytes.iter().enumerate() {
            let Some(offset) = self.map.buffer_offset(start + i) else {
                break;
            };
            count += self.buffer.write(offset, &[b]);
        }
        count
    }

    /// Paste clipboard text. Returns number of bytes written.
    ///
    /// Layouts with an assembler treat text that is not plain hex as source code and
    /// assemble it at the cursor address.
    ///
    /// # Errors
    /// Returns the [`AssembleError`] if the source did not assemble. Nothing is changed
    /// in that case.
    #[allow(clippy::cast_possible_truncation)]
    pub fn paste_text(&mut self, text: &str) -> Result<usize, AssembleError> {
        let Some(max) = self.map.max_nibble() else {
            return Ok(0);
        };

        if let Some(assembler) = self.layout.assembler()
            && !clipboard::looks_like_hex(text)
        {
            let Some(offset) = self.map.buffer_offset(self.cursor.byte()) else {
                return Ok(0);
            };
            let origin = self.buffer.base_address().wrapping_add(offset as u16);
            let bytes = assembler.assemble(text, origin)?;

            let count = self.buffer.write(offset, &bytes);
            debug!("Pasted {count} assembled bytes at ${origin:04X}");

            let target = self.locate(self.cursor.index());
            self.cursor.clear_selection();
            self.finish_edit(target);
            return Ok(count);
        }

        let bytes = clipboard::decode(text);
        if bytes.is_empty() {
            return Ok(0);
        }

        let count = if let Some(span) = self.cursor.selection().byte_range() {
            // Bounded by the selection, cursor and selection stay
            let start = *span.start();
            let limit = bytes.len().min(span.end() - start + 1);
            let count = self.write_projected(start, &bytes[..limit]);
            let target = self.locate(self.cursor.index());
            self.finish_edit(target);
            count
        } else {
            let start = self.cursor.byte();
            let count = self.write_projected(start, &bytes);
            let target = self.locate(((start + count) * 2).min(max));
            self.finish_edit(target);
            count
        };

        debug!("Pasted {count} hex bytes");
        Ok(count)
    }

    /// Route an edit-mode key. Returns `true` if the key was consumed.
    pub fn handle_key(&mut self, event: &KeyEvent) -> bool {
        if let Some(digit) = event.hex_digit() {
            return self.type_digit(digit);
        }

        let shift = event.modifiers.shift;
        let motion = match event.key {
            Key::Char(_) if event.modifiers.ctrl && event.is_char('a') => {
                self.select_all();
                return true;
            }
            Key::Backspace => return self.backspace(),
            Key::Delete => return self.delete(),
            Key::ArrowLeft => Motion::Left,
            Key::ArrowRight => Motion::Right,
            Key::ArrowUp => Motion::Up,
            Key::ArrowDown => Motion::Down,
            Key::Home => Motion::Home,
            Key::End => Motion::End,
            Key::PageUp => Motion::PageUp,
            Key::PageDown => Motion::PageDown,
            Key::Enter => Motion::Enter,
            Key::Tab if shift => Motion::BackTab,
            Key::Tab => Motion::Tab,
            _ => return false,
        };

        // Shift is part of Shift+Tab, not a selection modifier there
        self.move_cursor(motion, shift && motion != Motion::BackTab);
        true
    }

    /// Route a pointer event. Returns `true` if it was consumed.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        let max = self.map.max_nibble();
        match event {
            PointerEvent::Down { nibble, shift } => {
                self.cursor.pointer_down(nibble, shift, max);
                max.is_some()
            }
            PointerEvent::Move { nibble } => self.cursor.pointer_move(nibble, max),
            PointerEvent::Up => {
                let was_dragging = self.cursor.is_dragging();
                self.cursor.pointer_up();
                was_dragging
            }
        }
    }

    fn byte_view(&self, position: usize, show_cursor: bool) -> Option<ByteView> {
        let offset = self.map.buffer_offset(position)?;
        let selection = self.cursor.selection();

        Some(ByteView {
            position,
            value: self.buffer.byte(offset)?,
            modified: self.buffer.is_byte_modified(offset),
            selected: [
                selection.contains(position * 2),
                selection.contains(position * 2 + 1),
            ],
            cursor: (show_cursor && self.cursor.byte() == position).then(|| self.cursor.nibble()),
        })
    }

    /// Everything a renderer needs, one entry per line
    #[allow(clippy::cast_possible_truncation)]
    pub fn rows(&self, show_cursor: bool) -> Vec<RowView> {
        let base = self.buffer.base_address();

        match self.layout.navigation() {
            Navigation::Rows => (0..self.map.len())
                .step_by(self.bytes_per_row)
                .map(|start| {
                    let end = (start + self.bytes_per_row).min(self.map.len());
                    let bytes: Vec<ByteView> = (start..end)
                        .filter_map(|p| self.byte_view(p, show_cursor))
                        .collect();
                    let text = bytes
                        .iter()
                        .map(|b| {
                            if b.value.is_ascii_graphic() || b.value == b' ' {
                                b.value as char
                            } else {
                                '.'
                            }
                        })
                        .collect();
                    RowView {
                        address: base.wrapping_add(start as u16),
                        bytes,
                        text,
                    }
                })
                .collect(),
            Navigation::Cells => self
                .map
                .cells()
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    let bytes = (cell.byte_offset..=cell.last_byte())
                        .filter_map(|p| self.byte_view(p, show_cursor))
                        .collect();
                    let (address, text) = self.map.instruction(i).map_or_else(
                        || (base.wrapping_add(cell.byte_offset as u16), String::new()),
                        |instr| {
                            let text = if self.show_all_opcodes
                                || self.layout.is_official(&instr.mnemonic)
                            {
                                instr.assembly_text.clone()
                            } else {
                                "???".to_string()
                            };
                            (instr.address, text)
                        },
                    );
                    RowView {
                        address,
                        bytes,
                        text,
                    }
                })
                .collect(),
        }
    }
}
