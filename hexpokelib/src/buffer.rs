//! The `buffer` module provides [`EditBuffer`]: the two-buffer edit model.
//!
//! `original` is the last known state of device memory, `current` is the working copy.
//! A byte is modified when the two differ. Reverting copies data back from `original`,
//! either for a whole byte or for a single nibble.

/// Nibble position inside a byte. `0` is the high nibble, `1` the low one.
pub type Nibble = u8;

/// One modified byte, addressed absolutely
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    pub address: u16,
    pub value: u8,
}

#[derive(Debug, Clone, Default)]
pub struct EditBuffer {
    /// Absolute address of the first byte
    base_address: u16,
    /// Snapshot taken when the data was loaded
    original: Vec<u8>,
    /// Working copy
    current: Vec<u8>,
}

/// Put `digit` (0..=15) into the given nibble of `byte`
#[must_use]
pub const fn merge_nibble(byte: u8, nibble: Nibble, digit: u8) -> u8 {
    if nibble == 0 {
        (byte & 0x0F) | ((digit & 0x0F) << 4)
    } else {
        (byte & 0xF0) | (digit & 0x0F)
    }
}

/// Read one nibble of `byte`
#[must_use]
pub const fn nibble_of(byte: u8, nibble: Nibble) -> u8 {
    if nibble == 0 { byte >> 4 } else { byte & 0x0F }
}

impl EditBuffer {
    #[must_use]
    pub fn new(bytes: &[u8], base_address: u16) -> Self {
        let mut buffer = Self::default();
        buffer.load(bytes, base_address);
        buffer
    }

    /// Replace both buffers with a copy of `bytes`
    pub fn load(&mut self, bytes: &[u8], base_address: u16) {
        self.base_address = base_address;
        self.original = bytes.to_vec();
        self.current = bytes.to_vec();
    }

    #[must_use]
    pub const fn base_address(&self) -> u16 {
        self.base_address
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.current.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    #[must_use]
    pub fn current(&self) -> &[u8] {
        &self.current
    }

    #[must_use]
    pub fn original(&self) -> &[u8] {
        &self.original
    }

    /// Current value of byte at `index`
    #[must_use]
    pub fn byte(&self, index: usize) -> Option<u8> {
        self.current.get(index).copied()
    }

    /// Is there any byte that differs from the original
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.current != self.original
    }

    #[must_use]
    pub fn is_byte_modified(&self, index: usize) -> bool {
        self.current.get(index) != self.original.get(index)
    }

    /// Ordered list of modified bytes
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn changes(&self) -> Vec<Change> {
        self.current
            .iter()
            .zip(&self.original)
            .enumerate()
            .filter(|(_, (cur, orig))| cur != orig)
            .map(|(i, (&value, _))| Change {
                address: self.base_address.wrapping_add(i as u16),
                value,
            })
            .collect()
    }

    /// Make the working copy the new baseline.
    /// Only call after the device confirmed the write.
    pub fn commit(&mut self) {
        self.original.clone_from(&self.current);
    }

    /// Throw away all edits
    pub fn discard(&mut self) {
        self.current.clone_from(&self.original);
    }

    /// Overwrite one nibble of the working copy
    pub fn set_nibble(&mut self, index: usize, nibble: Nibble, digit: u8) {
        if let Some(byte) = self.current.get_mut(index) {
            *byte = merge_nibble(*byte, nibble, digit);
        }
    }

    /// Overwrite bytes starting at `index`. Bytes past the end are dropped.
    /// Returns number of bytes written.
    pub fn write(&mut self, index: usize, bytes: &[u8]) -> usize {
        let Some(dest) = self.current.get_mut(index..) else {
            return 0;
        };
        let count = bytes.len().min(dest.len());
        dest[..count].copy_from_slice(&bytes[..count]);
        count
    }

    /// Restore a whole byte from the original. Returns `true` if the byte changed.
    pub fn revert_byte(&mut self, index: usize) -> bool {
        match (self.current.get_mut(index), self.original.get(index)) {
            (Some(cur), Some(&orig)) if *cur != orig => {
                *cur = orig;
                true
            }
            _ => false,
        }
    }

    /// Restore a single nibble from the original, keeping the other one as edited
    pub fn revert_nibble(&mut self, index: usize, nibble: Nibble) {
        if let (Some(cur), Some(&orig)) = (self.current.get_mut(index), self.original.get(index))
        {
            *cur = merge_nibble(*cur, nibble, nibble_of(orig, nibble));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_and_modify() {
        // Arrange
        let mut buf = EditBuffer::new(&[0x00; 4], 0x2000);
        assert!(!buf.is_modified());

        // Act
        buf.set_nibble(2, 0, 0xA);

        // Assert
        assert!(buf.is_modified());
        assert!(buf.is_byte_modified(2));
        assert!(!buf.is_byte_modified(1));
        assert_eq!(buf.current(), &[0x00, 0x00, 0xA0, 0x00]);
        assert_eq!(buf.original(), &[0x00; 4]);
    }

    #[test]
    fn test_nibble_round_trip_all_values() {
        for value in 0..=255u8 {
            // High nibble first
            let mut buf = EditBuffer::new(&[0x00], 0);
            buf.set_nibble(0, 0, value >> 4);
            buf.set_nibble(0, 1, value & 0x0F);
            assert_eq!(buf.byte(0), Some(value));

            // Low nibble first
            let mut buf = EditBuffer::new(&[0xFF], 0);
            buf.set_nibble(0, 1, value & 0x0F);
            buf.set_nibble(0, 0, value >> 4);
            assert_eq!(buf.byte(0), Some(value));
        }
    }

    #[test]
    fn test_revert_nibble_keeps_other_nibble() {
        // Arrange
        let mut buf = EditBuffer::new(&[0x12], 0);
        buf.set_nibble(0, 1, 0x7); // 0x17
        buf.set_nibble(0, 0, 0xA); // 0xA7

        // Act
        buf.revert_nibble(0, 0);

        // Assert
        assert_eq!(buf.byte(0), Some(0x17));
    }

    #[test]
    fn test_revert_byte() {
        let mut buf = EditBuffer::new(&[0x12, 0x34], 0);
        buf.write(0, &[0xFF, 0xFF]);

        assert!(buf.revert_byte(1));
        assert!(!buf.revert_byte(1));
        assert!(!buf.revert_byte(7));
        assert_eq!(buf.current(), &[0xFF, 0x34]);
    }

    #[test]
    fn test_changes_commit_and_discard() {
        // Arrange
        let mut buf = EditBuffer::new(&[0x00; 5], 0x1000);
        buf.write(1, &[0xAA]);
        buf.write(3, &[0xBB]);

        // Act
        let changes = buf.changes();

        // Assert
        assert_eq!(
            changes,
            vec![
                Change { address: 0x1001, value: 0xAA },
                Change { address: 0x1003, value: 0xBB },
            ]
        );

        buf.discard();
        assert!(!buf.is_modified());

        buf.write(0, &[0x01]);
        buf.commit();
        assert!(!buf.is_modified());
        assert_eq!(buf.original()[0], 0x01);
    }

    #[test]
    fn test_write_is_bounded() {
        let mut buf = EditBuffer::new(&[0x00; 3], 0);
        assert_eq!(buf.write(1, &[1, 2, 3, 4]), 2);
        assert_eq!(buf.write(3, &[1]), 0);
        assert_eq!(buf.write(9, &[1]), 0);
        assert_eq!(buf.current(), &[0, 1, 2]);
    }
}
