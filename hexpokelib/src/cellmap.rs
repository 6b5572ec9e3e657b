//! Partitioning of an edit buffer into cells.
//!
//! A cell is one addressable editing unit: a single byte in the hex view, the bytes
//! of one decoded instruction in the disassembly view. The cursor never addresses the
//! buffer directly but the projection described by a [`CellMap`]: only bytes that
//! belong to some cell are part of the editable surface.

use crate::device::{Assembler, Disassembler, Instruction};

/// A run of `byte_length` projected bytes starting at `byte_offset`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub byte_offset: usize,
    pub byte_length: usize,
}

impl Cell {
    /// Projection index of the last byte
    #[must_use]
    pub const fn last_byte(&self) -> usize {
        self.byte_offset + self.byte_length - 1
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellMap {
    cells: Vec<Cell>,
    /// Owning cell of every projected byte
    byte_to_cell: Vec<usize>,
    /// Buffer index of every projected byte
    offsets: Vec<usize>,
    /// Decoded instruction per cell. Empty for fixed-width maps.
    instructions: Vec<Instruction>,
}

impl CellMap {
    /// One cell per byte, covering all of `length` bytes
    #[must_use]
    pub fn fixed(length: usize) -> Self {
        Self {
            cells: (0..length)
                .map(|i| Cell {
                    byte_offset: i,
                    byte_length: 1,
                })
                .collect(),
            byte_to_cell: (0..length).collect(),
            offsets: (0..length).collect(),
            instructions: Vec::new(),
        }
    }

    /// One cell per instruction, made only of the bytes the disassembler resolved.
    ///
    /// Instructions with no resolved bytes produce no cell. Bytes reported outside of
    /// a buffer of `buffer_length` bytes at `base_address` are ignored.
    #[must_use]
    pub fn from_instructions(
        instructions: Vec<Instruction>,
        base_address: u16,
        buffer_length: usize,
    ) -> Self {
        let mut map = Self::default();

        for instr in instructions {
            let start = instr.address.wrapping_sub(base_address) as usize;
            let byte_offset = map.offsets.len();

            for (i, byte) in instr.bytes.iter().enumerate() {
                let offset = start + i;
                if byte.is_some() && offset < buffer_length {
                    map.offsets.push(offset);
                    map.byte_to_cell.push(map.cells.len());
                }
            }

            let byte_length = map.offsets.len() - byte_offset;
            if byte_length > 0 {
                map.cells.push(Cell {
                    byte_offset,
                    byte_length,
                });
                map.instructions.push(instr);
            }
        }

        map
    }

    /// Number of projected bytes
    #[must_use]
    pub const fn len(&self) -> usize {
        self.offsets.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Highest valid nibble index, `None` for an empty map
    #[must_use]
    pub const fn max_nibble(&self) -> Option<usize> {
        if self.offsets.is_empty() {
            None
        } else {
            Some(self.offsets.len() * 2 - 1)
        }
    }

    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[must_use]
    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    /// Index of the cell owning projected byte `position`
    #[must_use]
    pub fn cell_of(&self, position: usize) -> Option<usize> {
        self.byte_to_cell.get(position).copied()
    }

    /// Buffer index behind projected byte `position`
    #[must_use]
    pub fn buffer_offset(&self, position: usize) -> Option<usize> {
        self.offsets.get(position).copied()
    }

    /// Projected position of buffer index `offset`, if it is part of a cell
    #[must_use]
    pub fn position_of(&self, offset: usize) -> Option<usize> {
        // Offsets are strictly increasing
        self.offsets.binary_search(&offset).ok()
    }

    /// Decoded instruction of cell `index` (disassembly maps only)
    #[must_use]
    pub fn instruction(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    /// Projected bytes taken from `buffer`
    #[must_use]
    pub fn valid_bytes(&self, buffer: &[u8]) -> Vec<u8> {
        self.offsets
            .iter()
            .filter_map(|&o| buffer.get(o).copied())
            .collect()
    }
}

/// How cursor motions between lines are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Fixed rows of `bytes_per_row` one-byte cells
    Rows,
    /// One variable-width cell per line
    Cells,
}

/// Strategy that turns buffer contents into a [`CellMap`]
pub trait CellLayout {
    fn build(&self, bytes: &[u8], base_address: u16) -> CellMap;

    fn navigation(&self) -> Navigation;

    /// Must the map be rebuilt after every modification
    fn rebuilds_on_edit(&self) -> bool {
        self.navigation() == Navigation::Cells
    }

    /// Assembler used to paste source text, if the layout supports it
    fn assembler(&self) -> Option<&dyn Assembler> {
        None
    }

    /// Render `mnemonic` as is even when opcodes are filtered
    fn is_official(&self, _mnemonic: &str) -> bool {
        true
    }
}

/// Plain hex view: every byte is its own cell
#[derive(Debug, Clone, Copy, Default)]
pub struct HexLayout;

impl CellLayout for HexLayout {
    fn build(&self, bytes: &[u8], _base_address: u16) -> CellMap {
        CellMap::fixed(bytes.len())
    }

    fn navigation(&self) -> Navigation {
        Navigation::Rows
    }
}

/// Instruction-aware view backed by a CPU toolchain
#[derive(Debug, Clone, Copy, Default)]
pub struct DisassemblyLayout<T> {
    toolchain: T,
}

impl<T> DisassemblyLayout<T> {
    pub const fn new(toolchain: T) -> Self {
        Self { toolchain }
    }
}

impl<T: Disassembler + Assembler> CellLayout for DisassemblyLayout<T> {
    fn build(&self, bytes: &[u8], base_address: u16) -> CellMap {
        let instructions = self.toolchain.disassemble(bytes, base_address);
        CellMap::from_instructions(instructions, base_address, bytes.len())
    }

    fn navigation(&self) -> Navigation {
        Navigation::Cells
    }

    fn assembler(&self) -> Option<&dyn Assembler> {
        Some(&self.toolchain)
    }

    fn is_official(&self, mnemonic: &str) -> bool {
        self.toolchain.is_official(mnemonic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mos6502::Mos6502;

    fn instr(address: u16, bytes: Vec<Option<u8>>) -> Instruction {
        Instruction {
            address,
            mnemonic: "NOP".into(),
            assembly_text: "NOP".into(),
            bytes,
        }
    }

    #[test]
    fn test_fixed_map_covers_buffer() {
        let map = CellMap::fixed(4);

        assert_eq!(map.len(), 4);
        assert_eq!(map.cells().len(), 4);
        assert_eq!(map.cell_of(3), Some(3));
        assert_eq!(map.buffer_offset(2), Some(2));
        assert_eq!(map.max_nibble(), Some(7));
        assert_eq!(CellMap::fixed(0).max_nibble(), None);
    }

    #[test]
    fn test_unresolved_bytes_are_excluded() {
        // Arrange
        let instructions = vec![
            instr(0x1000, vec![Some(0xA9), Some(0x01)]),
            instr(0x1002, vec![None]),
            instr(0x1003, vec![Some(0xEA)]),
        ];

        // Act
        let map = CellMap::from_instructions(instructions, 0x1000, 4);

        // Assert
        assert_eq!(
            map.cells(),
            &[
                Cell {
                    byte_offset: 0,
                    byte_length: 2
                },
                Cell {
                    byte_offset: 2,
                    byte_length: 1
                },
            ]
        );
        assert_eq!(map.valid_bytes(&[0xA9, 0x01, 0xFF, 0xEA]), vec![0xA9, 0x01, 0xEA]);
        assert_eq!(map.buffer_offset(2), Some(3));
        assert_eq!(map.position_of(2), None);
        assert_eq!(map.position_of(3), Some(2));
        assert_eq!(map.instruction(1).map(|i| i.address), Some(0x1003));
    }

    #[test]
    fn test_disassembly_layout_drops_truncated_tail() {
        // NOP, then a JMP with only one operand byte available
        let bytes = [0xEA, 0x4C, 0x00];
        let map = DisassemblyLayout::new(Mos6502).build(&bytes, 0xC000);

        assert!(map.valid_bytes(&bytes).len() < bytes.len());
        assert_eq!(map.valid_bytes(&bytes), vec![0xEA]);
        assert_eq!(map.cells().len(), 1);
    }

    #[test]
    fn test_layout_strategies() {
        let hex = HexLayout;
        let dis = DisassemblyLayout::new(Mos6502);

        assert!(!hex.rebuilds_on_edit());
        assert!(hex.assembler().is_none());
        assert!(dis.rebuilds_on_edit());
        assert!(dis.assembler().is_some());
        assert!(!dis.is_official("SLO"));

        let map = dis.build(&[0xA9, 0x01, 0x8D, 0x20, 0xD0, 0x60], 0);
        let lengths: Vec<usize> = map.cells().iter().map(|c| c.byte_length).collect();
        assert_eq!(lengths, vec![2, 3, 1]);
        assert_eq!(map.cell_of(4), Some(1));
    }
}
