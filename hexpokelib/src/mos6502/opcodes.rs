//! # Opcode table
//!
//! 256-entry NMOS 6502 opcode table indexed by opcode byte. Undocumented opcodes are
//! listed under their conventional names (`SLO`, `LAX`, `JAM`, ...) so every byte
//! decodes to something. [`OFFICIAL_MNEMONICS`] lists the 56 documented instructions.

/// How an instruction interprets its operand bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    /// No operand, e.g. `CLC`
    Implicit,
    /// Operates on the accumulator, e.g. `LSR A`
    Accumulator,
    /// `#$nn`
    Immediate,
    /// `$nn`
    ZeroPage,
    /// `$nn,X`
    ZeroPageX,
    /// `$nn,Y`
    ZeroPageY,
    /// Signed 8-bit branch offset, written as the absolute target
    Relative,
    /// `$nnnn`
    Absolute,
    /// `$nnnn,X`
    AbsoluteX,
    /// `$nnnn,Y`
    AbsoluteY,
    /// `($nnnn)`, only used by `JMP`
    Indirect,
    /// `($nn,X)`
    IndirectX,
    /// `($nn),Y`
    IndirectY,
}

impl AddressingMode {
    /// Total instruction size (opcode + operand) in bytes
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Implicit | Self::Accumulator => 1,
            Self::Immediate
            | Self::ZeroPage
            | Self::ZeroPageX
            | Self::ZeroPageY
            | Self::Relative
            | Self::IndirectX
            | Self::IndirectY => 2,
            Self::Absolute | Self::AbsoluteX | Self::AbsoluteY | Self::Indirect => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub mnemonic: &'static str,
    pub mode: AddressingMode,
}

const fn op(mnemonic: &'static str, mode: AddressingMode) -> Opcode {
    Opcode { mnemonic, mode }
}

use AddressingMode::{
    Absolute as ABS, AbsoluteX as ABX, AbsoluteY as ABY, Accumulator as ACC, Immediate as IMM,
    Implicit as IMP, Indirect as IND, IndirectX as IZX, IndirectY as IZY, Relative as REL,
    ZeroPage as ZP, ZeroPageX as ZPX, ZeroPageY as ZPY,
};

#[rustfmt::skip]
pub const OPCODE_TABLE: [Opcode; 256] = [
    // 0x00
    op("BRK", IMP), op("ORA", IZX), op("JAM", IMP), op("SLO", IZX),
    op("NOP", ZP),  op("ORA", ZP),  op("ASL", ZP),  op("SLO", ZP),
    op("PHP", IMP), op("ORA", IMM), op("ASL", ACC), op("ANC", IMM),
    op("NOP", ABS), op("ORA", ABS), op("ASL", ABS), op("SLO", ABS),
    // 0x10
    op("BPL", REL), op("ORA", IZY), op("JAM", IMP), op("SLO", IZY),
    op("NOP", ZPX), op("ORA", ZPX), op("ASL", ZPX), op("SLO", ZPX),
    op("CLC", IMP), op("ORA", ABY), op("NOP", IMP), op("SLO", ABY),
    op("NOP", ABX), op("ORA", ABX), op("ASL", ABX), op("SLO", ABX),
    // 0x20
    op("JSR", ABS), op("AND", IZX), op("JAM", IMP), op("RLA", IZX),
    op("BIT", ZP),  op("AND", ZP),  op("ROL", ZP),  op("RLA", ZP),
    op("PLP", IMP), op("AND", IMM), op("ROL", ACC), op("ANC", IMM),
    op("BIT", ABS), op("AND", ABS), op("ROL", ABS), op("RLA", ABS),
    // 0x30
    op("BMI", REL), op("AND", IZY), op("JAM", IMP), op("RLA", IZY),
    op("NOP", ZPX), op("AND", ZPX), op("ROL", ZPX), op("RLA", ZPX),
    op("SEC", IMP), op("AND", ABY), op("NOP", IMP), op("RLA", ABY),
    op("NOP", ABX), op("AND", ABX), op("ROL", ABX), op("RLA", ABX),
    // 0x40
    op("RTI", IMP), op("EOR", IZX), op("JAM", IMP), op("SRE", IZX),
    op("NOP", ZP),  op("EOR", ZP),  op("LSR", ZP),  op("SRE", ZP),
    op("PHA", IMP), op("EOR", IMM), op("LSR", ACC), op("ALR", IMM),
    op("JMP", ABS), op("EOR", ABS), op("LSR", ABS), op("SRE", ABS),
    // 0x50
    op("BVC", REL), op("EOR", IZY), op("JAM", IMP), op("SRE", IZY),
    op("NOP", ZPX), op("EOR", ZPX), op("LSR", ZPX), op("SRE", ZPX),
    op("CLI", IMP), op("EOR", ABY), op("NOP", IMP), op("SRE", ABY),
    op("NOP", ABX), op("EOR", ABX), op("LSR", ABX), op("SRE", ABX),
    // 0x60
    op("RTS", IMP), op("ADC", IZX), op("JAM", IMP), op("RRA", IZX),
    op("NOP", ZP),  op("ADC", ZP),  op("ROR", ZP),  op("RRA", ZP),
    op("PLA", IMP), op("ADC", IMM), op("ROR", ACC), op("ARR", IMM),
    op("JMP", IND), op("ADC", ABS), op("ROR", ABS), op("RRA", ABS),
    // 0x70
    op("BVS", REL), op("ADC", IZY), op("JAM", IMP), op("RRA", IZY),
    op("NOP", ZPX), op("ADC", ZPX), op("ROR", ZPX), op("RRA", ZPX),
    op("SEI", IMP), op("ADC", ABY), op("NOP", IMP), op("RRA", ABY),
    op("NOP", ABX), op("ADC", ABX), op("ROR", ABX), op("RRA", ABX),
    // 0x80
    op("NOP", IMM), op("STA", IZX), op("NOP", IMM), op("SAX", IZX),
    op("STY", ZP),  op("STA", ZP),  op("STX", ZP),  op("SAX", ZP),
    op("DEY", IMP), op("NOP", IMM), op("TXA", IMP), op("ANE", IMM),
    op("STY", ABS), op("STA", ABS), op("STX", ABS), op("SAX", ABS),
    // 0x90
    op("BCC", REL), op("STA", IZY), op("JAM", IMP), op("SHA", IZY),
    op("STY", ZPX), op("STA", ZPX), op("STX", ZPY), op("SAX", ZPY),
    op("TYA", IMP), op("STA", ABY), op("TXS", IMP), op("TAS", ABY),
    op("SHY", ABX), op("STA", ABX), op("SHX", ABY), op("SHA", ABY),
    // 0xA0
    op("LDY", IMM), op("LDA", IZX), op("LDX", IMM), op("LAX", IZX),
    op("LDY", ZP),  op("LDA", ZP),  op("LDX", ZP),  op("LAX", ZP),
    op("TAY", IMP), op("LDA", IMM), op("TAX", IMP), op("LXA", IMM),
    op("LDY", ABS), op("LDA", ABS), op("LDX", ABS), op("LAX", ABS),
    // 0xB0
    op("BCS", REL), op("LDA", IZY), op("JAM", IMP), op("LAX", IZY),
    op("LDY", ZPX), op("LDA", ZPX), op("LDX", ZPY), op("LAX", ZPY),
    op("CLV", IMP), op("LDA", ABY), op("TSX", IMP), op("LAS", ABY),
    op("LDY", ABX), op("LDA", ABX), op("LDX", ABY), op("LAX", ABY),
    // 0xC0
    op("CPY", IMM), op("CMP", IZX), op("NOP", IMM), op("DCP", IZX),
    op("CPY", ZP),  op("CMP", ZP),  op("DEC", ZP),  op("DCP", ZP),
    op("INY", IMP), op("CMP", IMM), op("DEX", IMP), op("SBX", IMM),
    op("CPY", ABS), op("CMP", ABS), op("DEC", ABS), op("DCP", ABS),
    // 0xD0
    op("BNE", REL), op("CMP", IZY), op("JAM", IMP), op("DCP", IZY),
    op("NOP", ZPX), op("CMP", ZPX), op("DEC", ZPX), op("DCP", ZPX),
    op("CLD", IMP), op("CMP", ABY), op("NOP", IMP), op("DCP", ABY),
    op("NOP", ABX), op("CMP", ABX), op("DEC", ABX), op("DCP", ABX),
    // 0xE0
    op("CPX", IMM), op("SBC", IZX), op("NOP", IMM), op("ISC", IZX),
    op("CPX", ZP),  op("SBC", ZP),  op("INC", ZP),  op("ISC", ZP),
    op("INX", IMP), op("SBC", IMM), op("NOP", IMP), op("USB", IMM),
    op("CPX", ABS), op("SBC", ABS), op("INC", ABS), op("ISC", ABS),
    // 0xF0
    op("BEQ", REL), op("SBC", IZY), op("JAM", IMP), op("ISC", IZY),
    op("NOP", ZPX), op("SBC", ZPX), op("INC", ZPX), op("ISC", ZPX),
    op("SED", IMP), op("SBC", ABY), op("NOP", IMP), op("ISC", ABY),
    op("NOP", ABX), op("SBC", ABX), op("INC", ABX), op("ISC", ABX),
];

/// The 56 documented NMOS 6502 mnemonics
pub const OFFICIAL_MNEMONICS: [&str; 56] = [
    "ADC", "AND", "ASL", "BCC", "BCS", "BEQ", "BIT", "BMI", "BNE", "BPL", "BRK", "BVC", "BVS",
    "CLC", "CLD", "CLI", "CLV", "CMP", "CPX", "CPY", "DEC", "DEX", "DEY", "EOR", "INC", "INX",
    "INY", "JMP", "JSR", "LDA", "LDX", "LDY", "LSR", "NOP", "ORA", "PHA", "PHP", "PLA", "PLP",
    "ROL", "ROR", "RTI", "RTS", "SBC", "SEC", "SED", "SEI", "STA", "STX", "STY", "TAX", "TAY",
    "TSX", "TXA", "TXS", "TYA",
];

/// Is `mnemonic` one of the documented instructions (case-insensitive)
#[must_use]
pub fn is_official_mnemonic(mnemonic: &str) -> bool {
    OFFICIAL_MNEMONICS
        .iter()
        .any(|m| m.eq_ignore_ascii_case(mnemonic))
}

/// Opcode byte for a documented `mnemonic` in the given `mode`.
/// Undocumented opcodes are never chosen, so assembled code stays portable.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn find_opcode(mnemonic: &str, mode: AddressingMode) -> Option<u8> {
    if !is_official_mnemonic(mnemonic) {
        return None;
    }
    OPCODE_TABLE
        .iter()
        .enumerate()
        .filter(|(_, o)| o.mode == mode && o.mnemonic.eq_ignore_ascii_case(mnemonic))
        .map(|(i, _)| i as u8)
        // $EA is the documented NOP; illegal NOPs share the mnemonic
        .find(|&code| !mnemonic.eq_ignore_ascii_case("NOP") || code == 0xEA)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_opcode_count() {
        // Each documented opcode is the unique encoding of its (mnemonic, mode) pair,
        // except NOP which appears under many undocumented encodings.
        let count = OPCODE_TABLE
            .iter()
            .enumerate()
            .filter(|(i, o)| is_official_mnemonic(o.mnemonic) && (o.mnemonic != "NOP" || *i == 0xEA))
            .count();
        assert_eq!(count, 151);
    }

    #[test]
    fn test_find_opcode() {
        assert_eq!(find_opcode("LDA", AddressingMode::Immediate), Some(0xA9));
        assert_eq!(find_opcode("lda", AddressingMode::Absolute), Some(0xAD));
        assert_eq!(find_opcode("JMP", AddressingMode::Indirect), Some(0x6C));
        assert_eq!(find_opcode("NOP", AddressingMode::Implicit), Some(0xEA));
        assert_eq!(find_opcode("SBC", AddressingMode::Immediate), Some(0xE9));
        assert_eq!(find_opcode("LAX", AddressingMode::ZeroPage), None);
        assert_eq!(find_opcode("STA", AddressingMode::Immediate), None);
    }

    #[test]
    fn test_sizes() {
        assert_eq!(OPCODE_TABLE[0x4C].mode.size(), 3);
        assert_eq!(OPCODE_TABLE[0xA9].mode.size(), 2);
        assert_eq!(OPCODE_TABLE[0xEA].mode.size(), 1);
    }
}
