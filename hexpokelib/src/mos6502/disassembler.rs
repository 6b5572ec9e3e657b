//! Linear-sweep 6502 disassembler.
//!
//! Every opcode byte decodes (undocumented ones included), so the only bytes that stay
//! unresolved are those of an instruction cut off by the end of the input. Such an
//! instruction is reported with all of its bytes set to `None`.

use super::opcodes::{AddressingMode, OPCODE_TABLE, Opcode};
use crate::device::Instruction;

/// Disassemble `bytes` as if loaded at `base_address`
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn disassemble(bytes: &[u8], base_address: u16) -> Vec<Instruction> {
    let mut instructions = Vec::new();
    let mut pc = 0;

    while pc < bytes.len() {
        let address = base_address.wrapping_add(pc as u16);
        let opcode = &OPCODE_TABLE[bytes[pc] as usize];
        let size = opcode.mode.size();

        if pc + size > bytes.len() {
            // Truncated by the end of the input
            let available = bytes.len() - pc;
            instructions.push(Instruction {
                address,
                mnemonic: opcode.mnemonic.to_string(),
                assembly_text: format!("{} ???", opcode.mnemonic),
                bytes: vec![None; available],
            });
            break;
        }

        let raw = &bytes[pc..pc + size];
        instructions.push(Instruction {
            address,
            mnemonic: opcode.mnemonic.to_string(),
            assembly_text: format_instruction(opcode, address, &raw[1..]),
            bytes: raw.iter().copied().map(Some).collect(),
        });
        pc += size;
    }

    instructions
}

/// Format a complete instruction as assembly text
#[must_use]
pub fn format_instruction(opcode: &Opcode, address: u16, operand: &[u8]) -> String {
    let operand = format_operand(opcode.mode, address, operand);
    if operand.is_empty() {
        opcode.mnemonic.to_string()
    } else {
        format!("{} {operand}", opcode.mnemonic)
    }
}

#[allow(
    clippy::enum_glob_use,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]
fn format_operand(mode: AddressingMode, address: u16, operand: &[u8]) -> String {
    use AddressingMode::*;

    let lo = operand.first().copied().unwrap_or_default();
    let word = u16::from_le_bytes([lo, operand.get(1).copied().unwrap_or_default()]);

    match mode {
        Implicit => String::new(),
        Accumulator => "A".to_string(),
        Immediate => format!("#${lo:02X}"),
        ZeroPage => format!("${lo:02X}"),
        ZeroPageX => format!("${lo:02X},X"),
        ZeroPageY => format!("${lo:02X},Y"),
        Relative => {
            // Target is relative to the address after the branch
            let target = address.wrapping_add(2).wrapping_add((lo as i8) as u16);
            format!("${target:04X}")
        }
        Absolute => format!("${word:04X}"),
        AbsoluteX => format!("${word:04X},X"),
        AbsoluteY => format!("${word:04X},Y"),
        Indirect => format!("(${word:04X})"),
        IndirectX => format!("(${lo:02X},X)"),
        IndirectY => format!("(${lo:02X}),Y"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disassemble_empty() {
        assert!(disassemble(&[], 0).is_empty());
    }

    #[test]
    fn test_disassemble_program() {
        // Arrange
        let bytes = [0xA9, 0x01, 0x8D, 0x20, 0xD0, 0xEA, 0xD0, 0xFB, 0x6C, 0xFC, 0xFF];

        // Act
        let instr = disassemble(&bytes, 0xC000);

        // Assert
        let texts: Vec<&str> = instr.iter().map(|i| i.assembly_text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["LDA #$01", "STA $D020", "NOP", "BNE $C003", "JMP ($FFFC)"]
        );
        assert_eq!(instr[1].address, 0xC002);
        assert_eq!(instr[1].bytes, vec![Some(0x8D), Some(0x20), Some(0xD0)]);
    }

    #[test]
    fn test_truncated_instruction_is_unresolved() {
        // JMP with only one operand byte available
        let instr = disassemble(&[0xEA, 0x4C, 0x00], 0x1000);

        assert_eq!(instr.len(), 2);
        assert_eq!(instr[1].address, 0x1001);
        assert_eq!(instr[1].bytes, vec![None, None]);
    }

    #[test]
    fn test_undocumented_opcodes_decode() {
        let instr = disassemble(&[0xA7, 0x10, 0x02], 0);

        assert_eq!(instr[0].assembly_text, "LAX $10");
        assert_eq!(instr[1].assembly_text, "JAM");
    }

    #[test]
    fn test_indexed_and_indirect_formats() {
        let instr = disassemble(
            &[0xB5, 0x10, 0xB6, 0x20, 0xBD, 0x00, 0x04, 0xA1, 0x30, 0xB1, 0x40, 0x0A],
            0,
        );
        let texts: Vec<&str> = instr.iter().map(|i| i.assembly_text.as_str()).collect();

        assert_eq!(
            texts,
            vec![
                "LDA $10,X",
                "LDX $20,Y",
                "LDA $0400,X",
                "LDA ($30,X)",
                "LDA ($40),Y",
                "ASL A"
            ]
        );
    }
}
