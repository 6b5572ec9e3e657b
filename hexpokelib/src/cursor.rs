//! Nibble-addressed cursor, selection and the navigation rules of both views.
//!
//! All positions are absolute nibble indices into the projection of a [`CellMap`]:
//! `byte * 2 + nibble`, with nibble `0` being the high one. Every move is clamped to
//! `[0, 2 * len - 1]`, so the cursor can never leave the editable surface.

use crate::buffer::Nibble;
use crate::cellmap::{CellMap, Navigation};
use std::ops::RangeInclusive;

/// Inclusive nibble range. Anchor and end may come in either order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub active: bool,
    pub anchor: usize,
    pub end: usize,
}

impl Selection {
    /// Effective `[min, max]` nibble range of an active selection
    #[must_use]
    pub fn range(&self) -> Option<RangeInclusive<usize>> {
        self.active
            .then(|| self.anchor.min(self.end)..=self.anchor.max(self.end))
    }

    /// Every byte touched by the selection
    #[must_use]
    pub fn byte_range(&self) -> Option<RangeInclusive<usize>> {
        self.range().map(|r| r.start() / 2..=r.end() / 2)
    }

    #[must_use]
    pub fn contains(&self, nibble: usize) -> bool {
        self.range().is_some_and(|r| r.contains(&nibble))
    }

    pub const fn clear(&mut self) {
        self.active = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    /// One byte forward
    Tab,
    /// One byte back (Shift+Tab)
    BackTab,
    /// Start of the next row or cell
    Enter,
}

/// Layout parameters the motions are resolved against
#[derive(Debug, Clone, Copy)]
pub struct Geometry<'a> {
    pub map: &'a CellMap,
    pub navigation: Navigation,
    pub bytes_per_row: usize,
    /// Bytes moved by a hex page up/down
    pub page_bytes: usize,
    /// Cells moved by a disassembly page up/down
    pub page_cells: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    /// Absolute nibble index
    index: usize,
    selection: Selection,
    /// Pointer button is held after a press on the editor
    dragging: bool,
}

impl Cursor {
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Projected byte under the cursor
    #[must_use]
    pub const fn byte(&self) -> usize {
        self.index / 2
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn nibble(&self) -> Nibble {
        (self.index % 2) as Nibble
    }

    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Back to the first nibble, nothing selected
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub const fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Place the cursor without touching the selection
    pub fn set_index(&mut self, index: usize, max_nibble: Option<usize>) {
        self.index = index.min(max_nibble.unwrap_or(0));
    }

    /// Select `[0, max]` and park the cursor at the end
    pub const fn select_all(&mut self, max_nibble: Option<usize>) {
        if let Some(max) = max_nibble {
            self.selection = Selection {
                active: true,
                anchor: 0,
                end: max,
            };
            self.index = max;
        }
    }

    /// Keep cursor and selection inside a projection that may have shrunk
    pub fn clamp(&mut self, max_nibble: Option<usize>) {
        let max = max_nibble.unwrap_or(0);
        self.index = self.index.min(max);
        self.selection.anchor = self.selection.anchor.min(max);
        self.selection.end = self.selection.end.min(max);
        if max_nibble.is_none() {
            self.selection.clear();
        }
    }

    /// Move to `target`. With `extend` the selection grows from the pre-move position,
    /// otherwise any selection is dropped.
    pub const fn move_to(&mut self, target: usize, extend: bool) {
        if extend {
            if !self.selection.active {
                self.selection = Selection {
                    active: true,
                    anchor: self.index,
                    end: self.index,
                };
            }
            self.selection.end = target;
        } else {
            self.selection.clear();
        }
        self.index = target;
    }

    /// Apply a keyboard motion. Returns `false` if the map is empty.
    pub fn apply(&mut self, motion: Motion, extend: bool, geo: &Geometry) -> bool {
        let Some(max) = geo.map.max_nibble() else {
            return false;
        };

        let target = match geo.navigation {
            Navigation::Rows => self.row_target(motion, extend, geo, max),
            Navigation::Cells => self.cell_target(motion, extend, geo, max),
        };

        self.move_to(target.min(max), extend);
        true
    }

    /// Targets shared by both views
    fn common_target(&self, motion: Motion, max: usize) -> Option<usize> {
        let byte = self.byte();
        match motion {
            Motion::Left => Some(self.index.saturating_sub(1)),
            Motion::Right => Some((self.index + 1).min(max)),
            Motion::Tab if byte < max / 2 => Some((byte + 1) * 2),
            Motion::Tab => Some(self.index),
            Motion::BackTab if self.nibble() == 1 => Some(byte * 2),
            Motion::BackTab => Some(byte.saturating_sub(1) * 2),
            _ => None,
        }
    }

    fn row_target(&self, motion: Motion, extend: bool, geo: &Geometry, max: usize) -> usize {
        if let Some(target) = self.common_target(motion, max) {
            return target;
        }

        let len = geo.map.len();
        let per_row = geo.bytes_per_row.max(1);
        let row_start = self.byte() - self.byte() % per_row;
        let row_step = per_row * 2;
        let page_step = geo.page_bytes * 2;

        match motion {
            Motion::Up => self.index.saturating_sub(row_step),
            Motion::Down => self.index + row_step,
            Motion::PageUp => self.index.saturating_sub(page_step),
            Motion::PageDown => self.index + page_step,
            Motion::Home => row_start * 2,
            Motion::End => {
                let last = (row_start + per_row).min(len) - 1;
                last * 2 + usize::from(extend)
            }
            Motion::Enter if row_start + per_row < len => (row_start + per_row) * 2,
            _ => self.index,
        }
    }

    fn cell_target(&self, motion: Motion, extend: bool, geo: &Geometry, max: usize) -> usize {
        if let Some(target) = self.common_target(motion, max) {
            return target;
        }

        let map = geo.map;
        let Some(cell_index) = map.cell_of(self.byte()) else {
            return self.index;
        };
        let Some(&cell) = map.cell(cell_index) else {
            return self.index;
        };
        let last_cell = map.cells().len() - 1;

        // Same byte offset inside the cell, clamped to the last byte on nibble 1
        let same_column = |target: usize| {
            map.cell(target).map_or(self.index, |t| {
                let column = self.byte() - cell.byte_offset;
                if column < t.byte_length {
                    (t.byte_offset + column) * 2 + usize::from(self.nibble())
                } else {
                    t.last_byte() * 2 + 1
                }
            })
        };
        let first_byte = |target: usize| map.cell(target).map_or(self.index, |t| t.byte_offset * 2);

        match motion {
            Motion::Up if cell_index > 0 => same_column(cell_index - 1),
            Motion::Down if cell_index < last_cell => same_column(cell_index + 1),
            Motion::PageUp => first_byte(cell_index.saturating_sub(geo.page_cells)),
            Motion::PageDown => first_byte((cell_index + geo.page_cells).min(last_cell)),
            Motion::Home => cell.byte_offset * 2,
            Motion::End => cell.last_byte() * 2 + usize::from(extend),
            Motion::Enter if cell_index < last_cell => first_byte(cell_index + 1),
            _ => self.index,
        }
    }

    /// Pointer pressed over `nibble`
    pub fn pointer_down(&mut self, nibble: usize, shift: bool, max_nibble: Option<usize>) {
        let Some(max) = max_nibble else { return };
        self.move_to(nibble.min(max), shift);
        self.dragging = true;
    }

    /// Pointer moved over `nibble`. Only has an effect while dragging.
    pub fn pointer_move(&mut self, nibble: usize, max_nibble: Option<usize>) -> bool {
        let Some(max) = max_nibble else { return false };
        let nibble = nibble.min(max);
        if !self.dragging || (nibble == self.index && !self.selection.active) {
            return false;
        }
        self.move_to(nibble, true);
        true
    }

    pub const fn pointer_up(&mut self) {
        self.dragging = false;
    }
}

/// Horizontal extent of one rendered byte
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ByteSpan {
    /// Projected byte index
    pub byte: usize,
    pub left: f32,
    pub right: f32,
}

/// Resolve a click at `x` within one rendered line to a nibble index.
///
/// Inside a byte the left half is its high nibble and the right half its low nibble.
/// In a gap, the click lands on the nibble right after the nearest byte to the left.
/// `spans` must be ordered left to right.
#[must_use]
pub fn hit_test(spans: &[ByteSpan], x: f32) -> Option<usize> {
    let first = spans.first()?;
    if x < first.left {
        return Some(first.byte * 2);
    }

    if let Some(span) = spans.iter().find(|s| s.left <= x && x < s.right) {
        let middle = f32::midpoint(span.left, span.right);
        return Some(span.byte * 2 + usize::from(x >= middle));
    }

    spans
        .iter()
        .rev()
        .find(|s| s.right <= x)
        .map(|s| (s.byte + 1) * 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Instruction;

    fn hex_geometry(map: &CellMap) -> Geometry<'_> {
        Geometry {
            map,
            navigation: Navigation::Rows,
            bytes_per_row: 4,
            page_bytes: 8,
            page_cells: 8,
        }
    }

    /// Cells of 2, 3, 1 and 3 bytes
    fn disasm_map() -> CellMap {
        let mk = |address: u16, len: usize| Instruction {
            address,
            mnemonic: String::new(),
            assembly_text: String::new(),
            bytes: vec![Some(0); len],
        };
        CellMap::from_instructions(vec![mk(0, 2), mk(2, 3), mk(5, 1), mk(6, 3)], 0, 9)
    }

    fn disasm_geometry(map: &CellMap) -> Geometry<'_> {
        Geometry {
            map,
            navigation: Navigation::Cells,
            bytes_per_row: 16,
            page_bytes: 256,
            page_cells: 2,
        }
    }

    #[test]
    fn test_selection_range_is_ordered() {
        let sel = Selection {
            active: true,
            anchor: 5,
            end: 2,
        };

        assert_eq!(sel.range(), Some(2..=5));
        assert_eq!(sel.byte_range(), Some(1..=2));
        assert!(sel.contains(3));
        assert!(!Selection::default().contains(0));
    }

    #[test]
    fn test_horizontal_moves_clamp() {
        // Arrange
        let map = CellMap::fixed(2);
        let geo = hex_geometry(&map);
        let mut cur = Cursor::default();

        // Act & Assert
        cur.apply(Motion::Left, false, &geo);
        assert_eq!(cur.index(), 0);

        for _ in 0..10 {
            cur.apply(Motion::Right, false, &geo);
        }
        assert_eq!(cur.index(), 3);
    }

    #[test]
    fn test_row_moves() {
        let map = CellMap::fixed(10);
        let geo = hex_geometry(&map);
        let mut cur = Cursor::default();

        cur.set_index(3, map.max_nibble()); // byte 1, low nibble
        cur.apply(Motion::Down, false, &geo);
        assert_eq!(cur.index(), 11);

        cur.apply(Motion::End, false, &geo);
        assert_eq!(cur.index(), 14);

        cur.apply(Motion::End, true, &geo);
        assert_eq!(cur.index(), 15);

        // Home lands on nibble 0 even when extending
        cur.apply(Motion::Home, true, &geo);
        assert_eq!(cur.index(), 8);
        assert_eq!(cur.selection().range(), Some(8..=14));

        cur.apply(Motion::Home, false, &geo);
        assert_eq!(cur.index(), 8);

        cur.apply(Motion::Enter, false, &geo);
        assert_eq!(cur.index(), 16);

        // Last row: Enter stays, Down clamps, End stops at the buffer end
        cur.apply(Motion::Enter, false, &geo);
        assert_eq!(cur.index(), 16);
        cur.apply(Motion::End, false, &geo);
        assert_eq!(cur.index(), 18);
        cur.apply(Motion::Down, false, &geo);
        assert_eq!(cur.index(), 19);

        cur.apply(Motion::PageUp, false, &geo);
        assert_eq!(cur.index(), 3);
        cur.apply(Motion::PageDown, false, &geo);
        assert_eq!(cur.index(), 19);
        cur.apply(Motion::PageUp, false, &geo);
        cur.apply(Motion::PageUp, false, &geo);
        cur.apply(Motion::PageDown, false, &geo);
        assert_eq!(cur.index(), 16);
    }

    #[test]
    fn test_tab_moves_by_byte() {
        let map = CellMap::fixed(3);
        let geo = hex_geometry(&map);
        let mut cur = Cursor::default();

        cur.set_index(1, map.max_nibble());
        cur.apply(Motion::Tab, false, &geo);
        assert_eq!(cur.index(), 2);

        // Shift+Tab from the low nibble goes to the high nibble of the same byte
        cur.set_index(3, map.max_nibble());
        cur.apply(Motion::BackTab, false, &geo);
        assert_eq!(cur.index(), 2);
        cur.apply(Motion::BackTab, false, &geo);
        assert_eq!(cur.index(), 0);

        // Last byte: Tab stays put on either nibble
        cur.set_index(5, map.max_nibble());
        cur.apply(Motion::Tab, false, &geo);
        assert_eq!(cur.index(), 5);
        cur.set_index(4, map.max_nibble());
        cur.apply(Motion::Tab, false, &geo);
        assert_eq!(cur.index(), 4);
    }

    #[test]
    fn test_extend_anchors_at_previous_position() {
        let map = CellMap::fixed(8);
        let geo = hex_geometry(&map);
        let mut cur = Cursor::default();
        cur.set_index(2, map.max_nibble());

        cur.apply(Motion::Right, true, &geo);
        cur.apply(Motion::Right, true, &geo);
        assert_eq!(cur.selection().range(), Some(2..=4));

        cur.apply(Motion::Left, false, &geo);
        assert!(!cur.selection().active);
        assert_eq!(cur.index(), 3);
    }

    #[test]
    fn test_cell_up_down_keeps_column() {
        // Arrange
        let map = disasm_map();
        let geo = disasm_geometry(&map);
        let mut cur = Cursor::default();

        // Third byte of the 3-byte cell, low nibble
        cur.set_index(9, map.max_nibble());

        // Act & Assert: shorter cells clamp to their last byte, nibble 1
        cur.apply(Motion::Up, false, &geo);
        assert_eq!(cur.index(), 3);

        cur.set_index(9, map.max_nibble());
        cur.apply(Motion::Down, false, &geo);
        assert_eq!(cur.index(), 11);

        cur.apply(Motion::Down, false, &geo);
        assert_eq!(cur.index(), 13);

        // Last cell: Down and Enter are no-ops
        cur.apply(Motion::Down, false, &geo);
        assert_eq!(cur.index(), 13);
        cur.apply(Motion::Enter, false, &geo);
        assert_eq!(cur.index(), 13);
    }

    #[test]
    fn test_cell_home_end_page() {
        let map = disasm_map();
        let geo = disasm_geometry(&map);
        let mut cur = Cursor::default();
        cur.set_index(6, map.max_nibble()); // start of cell 1

        cur.apply(Motion::End, false, &geo);
        assert_eq!(cur.index(), 8);
        cur.apply(Motion::End, true, &geo);
        assert_eq!(cur.index(), 9);
        cur.apply(Motion::Home, true, &geo);
        assert_eq!(cur.index(), 4);
        assert_eq!(cur.selection().range(), Some(4..=8));
        cur.apply(Motion::Home, false, &geo);
        assert_eq!(cur.index(), 4);

        cur.apply(Motion::PageDown, false, &geo);
        assert_eq!(cur.index(), 12);
        cur.apply(Motion::PageDown, false, &geo);
        assert_eq!(cur.index(), 12);
        cur.apply(Motion::PageUp, false, &geo);
        assert_eq!(cur.index(), 4);
        cur.apply(Motion::Enter, false, &geo);
        assert_eq!(cur.index(), 10);
    }

    #[test]
    fn test_empty_map_ignores_motion() {
        let map = CellMap::default();
        let geo = hex_geometry(&map);
        let mut cur = Cursor::default();

        assert!(!cur.apply(Motion::Right, false, &geo));
        assert_eq!(cur.index(), 0);
    }

    #[test]
    fn test_drag_selection() {
        let max = Some(15);
        let mut cur = Cursor::default();

        cur.pointer_down(4, false, max);
        assert!(!cur.pointer_move(4, max));
        assert!(cur.pointer_move(9, max));
        cur.pointer_up();
        assert!(!cur.pointer_move(12, max));

        assert_eq!(cur.selection().range(), Some(4..=9));
        assert_eq!(cur.index(), 9);

        // Shift+click extends from the same anchor
        cur.pointer_down(1, true, max);
        assert_eq!(cur.selection().range(), Some(1..=4));

        // Plain click drops it
        cur.pointer_down(7, false, max);
        assert!(!cur.selection().active);
    }

    #[test]
    fn test_hit_test() {
        let spans = [
            ByteSpan {
                byte: 0,
                left: 10.0,
                right: 30.0,
            },
            ByteSpan {
                byte: 1,
                left: 40.0,
                right: 60.0,
            },
        ];

        assert_eq!(hit_test(&spans, 12.0), Some(0));
        assert_eq!(hit_test(&spans, 25.0), Some(1));
        assert_eq!(hit_test(&spans, 35.0), Some(2));
        assert_eq!(hit_test(&spans, 55.0), Some(3));
        assert_eq!(hit_test(&spans, 90.0), Some(4));
        assert_eq!(hit_test(&spans, 0.0), Some(0));
        assert_eq!(hit_test(&[], 5.0), None);
    }
}
