//! Planning of the single contiguous write that flushes an [`EditBuffer`].

use crate::buffer::EditBuffer;

/// One `write_memory` call: `bytes` placed at `address`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRange {
    pub address: u16,
    pub bytes: Vec<u8>,
}

impl CommitRange {
    /// Last address written (inclusive)
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn end_address(&self) -> u16 {
        self.address
            .wrapping_add(self.bytes.len().saturating_sub(1) as u16)
    }
}

/// Span from the first to the last modified byte, interior bytes included.
/// `None` if nothing was modified.
#[must_use]
pub fn plan_commit(buffer: &EditBuffer) -> Option<CommitRange> {
    let changes = buffer.changes();
    let first = changes.first()?;
    let last = changes.last()?;

    let base = buffer.base_address();
    let start = first.address.wrapping_sub(base) as usize;
    let end = last.address.wrapping_sub(base) as usize;

    Some(CommitRange {
        address: first.address,
        bytes: buffer.current().get(start..=end)?.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_to_commit() {
        let buf = EditBuffer::new(&[1, 2, 3], 0x1000);
        assert_eq!(plan_commit(&buf), None);
    }

    #[test]
    fn test_commit_spans_first_to_last_change() {
        // Arrange
        let mut buf = EditBuffer::new(&[0x00; 5], 0x1000);
        buf.write(1, &[0xAA]);
        buf.write(3, &[0xBB]);

        // Act
        let plan = plan_commit(&buf);

        // Assert
        let expected = CommitRange {
            address: 0x1001,
            bytes: vec![0xAA, 0x00, 0xBB],
        };
        assert_eq!(plan, Some(expected));
        assert_eq!(plan.map(|p| p.end_address()), Some(0x1003));
    }

    #[test]
    fn test_single_byte_commit() {
        let mut buf = EditBuffer::new(&[0x00; 16], 0xC000);
        buf.set_nibble(0, 0, 0xE);
        buf.set_nibble(0, 1, 0xA);

        assert_eq!(
            plan_commit(&buf),
            Some(CommitRange {
                address: 0xC000,
                bytes: vec![0xEA]
            })
        );
    }
}
