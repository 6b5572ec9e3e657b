//! The `address` module keeps requested windows inside the 16-bit address space.
//!
//! Every window the editor works with is a [`MemoryWindow`]: a base address plus a
//! length that never reaches past `$FFFF`. Out-of-range requests are clamped,
//! never rejected.

/// Size of the 6502 address space in bytes
pub const ADDRESS_SPACE_SIZE: usize = 0x10000;

/// Clamp a requested base address so that a window of `window_length` bytes fits
/// into the address space.
///
/// The function is total: negative addresses clamp to `0`, addresses that would make
/// the window overflow are pulled down to `0x10000 - window_length`.
/// Callers pick a sane `window_length` (at most `0x10000`).
///
/// # Example
/// ```
/// use hexpokelib::validate_address;
///
/// assert_eq!(validate_address(-5, 16), 0x0000);
/// assert_eq!(validate_address(0xFFF8, 16), 0xFFF0);
/// assert_eq!(validate_address(0xC000, 16), 0xC000);
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn validate_address(address: i64, window_length: usize) -> u16 {
    let mut addr = address.max(0);

    let limit = ADDRESS_SPACE_SIZE.saturating_sub(window_length) as i64;
    if addr.saturating_add(window_length as i64) > ADDRESS_SPACE_SIZE as i64 {
        addr = limit;
    }

    addr.clamp(0, 0xFFFF) as u16
}

/// A contiguous view of the address space: `base_address..base_address + length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryWindow {
    pub base_address: u16,
    pub length: usize,
}

impl MemoryWindow {
    /// Creates a window, clamping length into `1..=0x10000` and the base address so
    /// that the window does not wrap past the top of memory.
    #[must_use]
    pub fn new(address: i64, length: usize) -> Self {
        let length = length.clamp(1, ADDRESS_SPACE_SIZE);
        Self {
            base_address: validate_address(address, length),
            length,
        }
    }

    /// Same window moved by `delta` bytes, clamped to the address space
    #[must_use]
    pub fn shifted(&self, delta: i64) -> Self {
        Self::new(i64::from(self.base_address) + delta, self.length)
    }

    /// Inclusive address range covered by the window
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn range(&self) -> AddressRange {
        let end = self.base_address as usize + self.length - 1;
        AddressRange {
            start_address: self.base_address,
            end_address: end as u16,
            length: self.length,
        }
    }

    /// Is the absolute `address` inside the window
    #[must_use]
    pub const fn contains(&self, address: u16) -> bool {
        let addr = address as usize;
        addr >= self.base_address as usize && addr < self.base_address as usize + self.length
    }
}

/// Inclusive start/end of a loaded window, as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange {
    pub start_address: u16,
    pub end_address: u16,
    pub length: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_validate_keeps_valid_address() {
        assert_eq!(validate_address(0x1000, 0x100), 0x1000);
        assert_eq!(validate_address(0xFF00, 0x100), 0xFF00);
    }

    #[test]
    fn test_validate_clamps_negative_and_overflow() {
        assert_eq!(validate_address(-1, 0x100), 0);
        assert_eq!(validate_address(0xFF01, 0x100), 0xFF00);
        assert_eq!(validate_address(0x12_3456, 0x10), 0xFFF0);
        assert_eq!(validate_address(0x10, 0x10000), 0);
    }

    #[test]
    fn test_validate_is_total() {
        // Arrange
        let mut rng = rand::rng();

        for _ in 0..10_000 {
            let address: i64 = rng.random_range(-0x2_0000..0x3_0000);
            let length: usize = rng.random_range(1..=ADDRESS_SPACE_SIZE);

            // Act
            let res = validate_address(address, length);

            // Assert
            assert!(res as usize + length <= ADDRESS_SPACE_SIZE);
        }
    }

    #[test]
    fn test_window_range_and_shift() {
        // Arrange
        let window = MemoryWindow::new(0xC000, 16);

        // Act
        let range = window.range();
        let moved = window.shifted(-0xD000);
        let top = window.shifted(0x4000);

        // Assert
        assert_eq!(range.start_address, 0xC000);
        assert_eq!(range.end_address, 0xC00F);
        assert_eq!(range.length, 16);
        assert_eq!(moved.base_address, 0x0000);
        assert_eq!(top.base_address, 0xFFF0);
        assert!(window.contains(0xC00F));
        assert!(!window.contains(0xC010));
    }

    #[test]
    fn test_window_clamps_length() {
        let window = MemoryWindow::new(0x100, 0);
        assert_eq!(window.length, 1);

        let window = MemoryWindow::new(0x100, 0x2_0000);
        assert_eq!(window.length, ADDRESS_SPACE_SIZE);
        assert_eq!(window.base_address, 0);
        assert_eq!(window.range().end_address, 0xFFFF);
    }
}
