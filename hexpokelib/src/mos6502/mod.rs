//! MOS 6502 instruction set: opcode table, disassembler and a small assembler.

mod assembler;
mod disassembler;
pub mod opcodes;

pub use assembler::assemble;
pub use disassembler::{disassemble, format_instruction};
pub use opcodes::{AddressingMode, OFFICIAL_MNEMONICS, Opcode, is_official_mnemonic};

use crate::device::{Assembler, Disassembler, Instruction};
use crate::error::AssembleError;

/// The 6502 toolchain as used by the disassembly view
#[derive(Debug, Clone, Copy, Default)]
pub struct Mos6502;

impl Disassembler for Mos6502 {
    fn disassemble(&self, bytes: &[u8], base_address: u16) -> Vec<Instruction> {
        disassemble(bytes, base_address)
    }

    fn is_official(&self, mnemonic: &str) -> bool {
        is_official_mnemonic(mnemonic)
    }
}

impl Assembler for Mos6502 {
    fn assemble(&self, text: &str, origin: u16) -> Result<Vec<u8>, AssembleError> {
        assemble(text, origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_then_disassemble() {
        let cpu = Mos6502;
        let bytes = cpu.assemble("LDY #$10\nloop: DEY\nBNE loop\nRTS", 0x0801);

        let Ok(bytes) = bytes else {
            panic!("assembly failed: {bytes:?}");
        };
        let texts: Vec<String> = cpu
            .disassemble(&bytes, 0x0801)
            .into_iter()
            .map(|i| i.assembly_text)
            .collect();

        assert_eq!(texts, vec!["LDY #$10", "DEY", "BNE $0803", "RTS"]);
    }

    #[test]
    fn test_is_official() {
        assert!(Mos6502.is_official("lda"));
        assert!(!Mos6502.is_official("LAX"));
    }
}
