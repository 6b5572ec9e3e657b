//! Collaborators of the editor core.
//!
//! The editor never talks to the hardware or to a CPU toolchain directly. It depends on
//! three small traits: [`DeviceMemory`] for bulk reads/writes of device RAM,
//! [`Disassembler`] and [`Assembler`] for the instruction-aware view.
//!
//! [`SimulatedDevice`] is an in-process 64K RAM that implements [`DeviceMemory`].

use crate::address::ADDRESS_SPACE_SIZE;
use crate::error::{ApiError, AssembleError};
use log::debug;

/// Bulk access to the memory of the remote device
pub trait DeviceMemory {
    /// Read `length` bytes starting at `address`.
    ///
    /// # Errors
    /// Returns an [`ApiError`] if the device could not be reached or refused the read.
    fn read_memory(&mut self, address: u16, length: usize) -> Result<Vec<u8>, ApiError>;

    /// Write `bytes` starting at `address`. Callers guarantee the range fits.
    ///
    /// # Errors
    /// Returns an [`ApiError`] if the device could not be reached or refused the write.
    fn write_memory(&mut self, address: u16, bytes: &[u8]) -> Result<(), ApiError>;
}

/// One decoded instruction, as reported by a [`Disassembler`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Address of the first byte
    pub address: u16,
    /// Instruction name, e.g. `LDA` or `SLO`
    pub mnemonic: String,
    /// Full text, e.g. `LDA #$01`
    pub assembly_text: String,
    /// Bytes of the instruction. `None` marks bytes the disassembler could not resolve.
    pub bytes: Vec<Option<u8>>,
}

pub trait Disassembler {
    /// Decode `bytes` as a linear sweep starting at `base_address`
    fn disassemble(&self, bytes: &[u8], base_address: u16) -> Vec<Instruction>;

    /// Is `mnemonic` part of the documented instruction set
    fn is_official(&self, mnemonic: &str) -> bool;
}

pub trait Assembler {
    /// Assemble source `text` as if placed at `origin`.
    ///
    /// # Errors
    /// Returns an [`AssembleError`] describing the first offending line.
    fn assemble(&self, text: &str, origin: u16) -> Result<Vec<u8>, AssembleError>;
}

/// 64K of RAM living in the process. Stands in for the remote device.
#[derive(Debug, Clone)]
pub struct SimulatedDevice {
    ram: Vec<u8>,
    /// Error returned by the next read, then cleared
    fail_next_read: Option<ApiError>,
    /// Error returned by the next write, then cleared
    fail_next_write: Option<ApiError>,
    /// Every successful write as (address, bytes)
    writes: Vec<(u16, Vec<u8>)>,
    /// Number of read requests served
    reads: usize,
}

impl Default for SimulatedDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedDevice {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ram: vec![0; ADDRESS_SPACE_SIZE],
            fail_next_read: None,
            fail_next_write: None,
            writes: Vec::new(),
            reads: 0,
        }
    }

    /// Copy an image into RAM at `address`. Bytes past `$FFFF` are dropped.
    /// Returns number of bytes copied.
    pub fn load_image(&mut self, address: u16, bytes: &[u8]) -> usize {
        let start = address as usize;
        let count = bytes.len().min(ADDRESS_SPACE_SIZE - start);
        self.ram[start..start + count].copy_from_slice(&bytes[..count]);
        debug!("Loaded {count} bytes into simulated RAM at ${address:04X}");
        count
    }

    #[must_use]
    pub fn ram(&self) -> &[u8] {
        &self.ram
    }

    pub fn fail_next_read(&mut self, err: ApiError) {
        self.fail_next_read = Some(err);
    }

    pub fn fail_next_write(&mut self, err: ApiError) {
        self.fail_next_write = Some(err);
    }

    /// Writes served so far, oldest first
    #[must_use]
    pub fn writes(&self) -> &[(u16, Vec<u8>)] {
        &self.writes
    }

    #[must_use]
    pub const fn reads(&self) -> usize {
        self.reads
    }

    fn check_range(address: u16, length: usize) -> Result<(), ApiError> {
        if address as usize + length > ADDRESS_SPACE_SIZE {
            return Err(ApiError::OutOfRange { address, length });
        }
        Ok(())
    }
}

impl DeviceMemory for SimulatedDevice {
    fn read_memory(&mut self, address: u16, length: usize) -> Result<Vec<u8>, ApiError> {
        if let Some(err) = self.fail_next_read.take() {
            return Err(err);
        }
        Self::check_range(address, length)?;

        self.reads += 1;
        let start = address as usize;
        Ok(self.ram[start..start + length].to_vec())
    }

    fn write_memory(&mut self, address: u16, bytes: &[u8]) -> Result<(), ApiError> {
        if let Some(err) = self.fail_next_write.take() {
            return Err(err);
        }
        Self::check_range(address, bytes.len())?;

        let start = address as usize;
        self.ram[start..start + bytes.len()].copy_from_slice(bytes);
        self.writes.push((address, bytes.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_read_write() {
        // Arrange
        let mut dev = SimulatedDevice::new();
        dev.load_image(0xC000, &[1, 2, 3]);

        // Act
        let res = dev.write_memory(0xC001, &[0xAA]);
        let bytes = dev.read_memory(0xC000, 3);

        // Assert
        assert_eq!(res, Ok(()));
        assert_eq!(bytes, Ok(vec![1, 0xAA, 3]));
        assert_eq!(dev.writes(), &[(0xC001, vec![0xAA])]);
        assert_eq!(dev.reads(), 1);
    }

    #[test]
    fn test_simulated_rejects_out_of_range() {
        let mut dev = SimulatedDevice::new();
        assert_eq!(
            dev.read_memory(0xFFFF, 2),
            Err(ApiError::OutOfRange {
                address: 0xFFFF,
                length: 2
            })
        );
        assert!(dev.write_memory(0xFFFE, &[0, 0, 0]).is_err());
    }

    #[test]
    fn test_simulated_fault_injection_is_one_shot() {
        let mut dev = SimulatedDevice::new();
        dev.fail_next_read(ApiError::Transport("timeout".into()));

        assert!(dev.read_memory(0, 1).is_err());
        assert!(dev.read_memory(0, 1).is_ok());
    }

    #[test]
    fn test_load_image_truncates_at_top() {
        let mut dev = SimulatedDevice::new();
        assert_eq!(dev.load_image(0xFFFE, &[1, 2, 3, 4]), 2);
        assert_eq!(&dev.ram()[0xFFFE..], &[1, 2]);
    }
}
