//! Two-pass line assembler for documented 6502 instructions.
//!
//! Accepted syntax, one statement per line:
//! - `; comment`
//! - `label:` optionally followed by a statement on the same line
//! - `NAME = expr` constant definitions
//! - `*= expr` or `.org expr` to set the assumed address
//! - `.byte expr, expr, ...` (alias `.db`)
//! - `MNEMONIC operand` in the usual `#$nn`, `$nn,X`, `($nn),Y`, `($nnnn)` forms
//!
//! Numbers are `$hex`, `0xhex`, `%binary` or decimal; `*` is the current address.
//! Expressions are sums and differences of those terms and labels.
//!
//! Pass one fixes each instruction's addressing mode (and thus its size). Operands
//! that reference labels not yet defined are sized as absolute.

use super::opcodes::{AddressingMode, find_opcode, is_official_mnemonic};
use crate::error::{AssembleError, AssembleErrorKind};
use std::collections::HashMap;

const BRANCHES: [&str; 8] = ["BPL", "BMI", "BVC", "BVS", "BCC", "BCS", "BNE", "BEQ"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteSelect {
    Whole,
    Low,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Index {
    None,
    X,
    Y,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Operand {
    None,
    Accumulator,
    Immediate(String, ByteSelect),
    Indirect(String),
    IndirectX(String),
    IndirectY(String),
    Direct(String, Index),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Body {
    Empty,
    Constant(String, String),
    Org(String),
    Bytes(Vec<String>),
    Instruction(String, Operand),
}

#[derive(Debug)]
struct Line {
    number: usize,
    label: Option<String>,
    body: Body,
}

type Symbols = HashMap<String, u32>;

/// Assemble `text` as if its first byte is placed at `origin`.
///
/// # Errors
/// Returns [`AssembleError::Empty`] if the text holds no code, otherwise the first
/// offending line and what is wrong with it.
///
/// # Example
/// ```
/// use hexpokelib::mos6502::assemble;
///
/// let bytes = assemble("LDA #$01\nSTA $D020", 0xC000).unwrap();
/// assert_eq!(bytes, vec![0xA9, 0x01, 0x8D, 0x20, 0xD0]);
/// ```
#[allow(clippy::cast_possible_truncation)]
pub fn assemble(text: &str, origin: u16) -> Result<Vec<u8>, AssembleError> {
    let lines: Vec<Line> = text
        .lines()
        .enumerate()
        .map(|(i, raw)| parse_line(raw, i + 1))
        .collect::<Result<_, _>>()?;

    let has_code = lines
        .iter()
        .any(|l| matches!(l.body, Body::Bytes(_) | Body::Instruction(..)));
    if !has_code {
        return Err(AssembleError::Empty);
    }

    // Pass 1: collect symbols and fix addressing modes
    let mut symbols = Symbols::new();
    let mut modes = Vec::with_capacity(lines.len());
    let mut pc = origin;

    for line in &lines {
        let at = |kind| AssembleError::Line(kind, line.number);

        if let Some(label) = &line.label {
            define(&mut symbols, label, u32::from(pc)).map_err(at)?;
        }

        let mode = match &line.body {
            Body::Empty => None,
            Body::Constant(name, expr) => {
                let value = require(expr, &symbols, pc).map_err(at)?;
                define(&mut symbols, name, value).map_err(at)?;
                None
            }
            Body::Org(expr) => {
                pc = to_word(require(expr, &symbols, pc).map_err(at)?).map_err(at)?;
                None
            }
            Body::Bytes(exprs) => {
                pc = pc.wrapping_add(exprs.len() as u16);
                None
            }
            Body::Instruction(mnemonic, operand) => {
                let mode = select_mode(mnemonic, operand, &symbols, pc).map_err(at)?;
                pc = pc.wrapping_add(mode.size() as u16);
                Some(mode)
            }
        };
        modes.push(mode);
    }

    // Pass 2: encode with the complete symbol table
    let mut out = Vec::new();
    let mut pc = origin;

    for (line, mode) in lines.iter().zip(modes) {
        let at = |kind| AssembleError::Line(kind, line.number);

        match &line.body {
            Body::Empty | Body::Constant(..) => {}
            Body::Org(expr) => {
                pc = to_word(require(expr, &symbols, pc).map_err(at)?).map_err(at)?;
            }
            Body::Bytes(exprs) => {
                for expr in exprs {
                    out.push(to_byte(require(expr, &symbols, pc).map_err(at)?).map_err(at)?);
                    pc = pc.wrapping_add(1);
                }
            }
            Body::Instruction(mnemonic, operand) => {
                let Some(mode) = mode else { continue };
                let bytes = encode(mnemonic, operand, mode, &symbols, pc).map_err(at)?;
                pc = pc.wrapping_add(bytes.len() as u16);
                out.extend(bytes);
            }
        }
    }

    Ok(out)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_line(raw: &str, number: usize) -> Result<Line, AssembleError> {
    let mut code = raw.find(';').map_or(raw, |i| &raw[..i]).trim();
    let mut label = None;

    if let Some((head, tail)) = code.split_once(':')
        && is_identifier(head.trim())
    {
        label = Some(head.trim().to_string());
        code = tail.trim();
    }

    if code.is_empty() {
        return Ok(Line {
            number,
            label,
            body: Body::Empty,
        });
    }

    let body = if let Some(rest) = code.strip_prefix('*') {
        let Some(expr) = rest.trim_start().strip_prefix('=') else {
            return Err(AssembleError::Line(
                AssembleErrorKind::InvalidOperand(code.to_string()),
                number,
            ));
        };
        Body::Org(expr.trim().to_string())
    } else if code.starts_with('.') {
        let (directive, rest) = code.split_once(char::is_whitespace).unwrap_or((code, ""));
        match directive.to_ascii_lowercase().as_str() {
            ".org" => Body::Org(rest.trim().to_string()),
            ".byte" | ".db" => Body::Bytes(rest.split(',').map(|s| s.trim().to_string()).collect()),
            _ => {
                return Err(AssembleError::Line(
                    AssembleErrorKind::UnknownMnemonic(directive.to_string()),
                    number,
                ));
            }
        }
    } else if let Some((name, expr)) = code.split_once('=')
        && is_identifier(name.trim())
    {
        Body::Constant(name.trim().to_string(), expr.trim().to_string())
    } else {
        let split = code
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(code.len());
        let (mnemonic, rest) = code.split_at(split);
        Body::Instruction(mnemonic.to_ascii_uppercase(), parse_operand(rest))
    };

    Ok(Line {
        number,
        label,
        body,
    })
}

fn parse_operand(text: &str) -> Operand {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let upper = compact.to_ascii_uppercase();

    if compact.is_empty() {
        return Operand::None;
    }
    if upper == "A" {
        return Operand::Accumulator;
    }
    if let Some(rest) = compact.strip_prefix('#') {
        return match rest.chars().next() {
            Some('<') => Operand::Immediate(rest[1..].to_string(), ByteSelect::Low),
            Some('>') => Operand::Immediate(rest[1..].to_string(), ByteSelect::High),
            _ => Operand::Immediate(rest.to_string(), ByteSelect::Whole),
        };
    }

    let len = compact.len();
    if compact.starts_with('(') {
        if upper.ends_with(",X)") {
            return Operand::IndirectX(compact[1..len - 3].to_string());
        }
        if upper.ends_with("),Y") {
            return Operand::IndirectY(compact[1..len - 3].to_string());
        }
        if upper.ends_with(')') {
            return Operand::Indirect(compact[1..len - 1].to_string());
        }
    }
    if upper.ends_with(",X") {
        return Operand::Direct(compact[..len - 2].to_string(), Index::X);
    }
    if upper.ends_with(",Y") {
        return Operand::Direct(compact[..len - 2].to_string(), Index::Y);
    }
    Operand::Direct(compact, Index::None)
}

fn define(symbols: &mut Symbols, name: &str, value: u32) -> Result<(), AssembleErrorKind> {
    if symbols.insert(name.to_string(), value).is_some() {
        return Err(AssembleErrorKind::DuplicateLabel(name.to_string()));
    }
    Ok(())
}

fn parse_term(term: &str, symbols: &Symbols, pc: u16) -> Result<Option<u32>, AssembleErrorKind> {
    let invalid = || AssembleErrorKind::InvalidOperand(term.to_string());

    let number = |digits: &str, radix| u32::from_str_radix(digits, radix).map_err(|_| invalid());

    if term == "*" {
        Ok(Some(u32::from(pc)))
    } else if let Some(hex) = term.strip_prefix('$') {
        number(hex, 16).map(Some)
    } else if let Some(hex) = term.strip_prefix("0x").or_else(|| term.strip_prefix("0X")) {
        number(hex, 16).map(Some)
    } else if let Some(bin) = term.strip_prefix('%') {
        number(bin, 2).map(Some)
    } else if term.starts_with(|c: char| c.is_ascii_digit()) {
        number(term, 10).map(Some)
    } else if is_identifier(term) {
        Ok(symbols.get(term).copied())
    } else {
        Err(invalid())
    }
}

/// Evaluate `expr`. `Ok(None)` means it references a label not defined yet.
fn evaluate(expr: &str, symbols: &Symbols, pc: u16) -> Result<Option<u32>, AssembleErrorKind> {
    let invalid = || AssembleErrorKind::InvalidOperand(expr.to_string());

    let mut total: i64 = 0;
    let mut unknown = false;
    let mut sign = 1;
    let mut rest = expr.trim();

    loop {
        let end = rest.find(['+', '-']).unwrap_or(rest.len());
        let term = rest[..end].trim();
        if term.is_empty() {
            return Err(invalid());
        }

        match parse_term(term, symbols, pc)? {
            Some(value) => total += sign * i64::from(value),
            None => unknown = true,
        }

        if end == rest.len() {
            break;
        }
        sign = if rest[end..].starts_with('-') { -1 } else { 1 };
        rest = &rest[end + 1..];
    }

    if unknown {
        return Ok(None);
    }
    u32::try_from(total).map(Some).map_err(|_| invalid())
}

fn require(expr: &str, symbols: &Symbols, pc: u16) -> Result<u32, AssembleErrorKind> {
    evaluate(expr, symbols, pc)?.ok_or_else(|| AssembleErrorKind::UndefinedLabel(expr.to_string()))
}

fn to_byte(value: u32) -> Result<u8, AssembleErrorKind> {
    u8::try_from(value).map_err(|_| AssembleErrorKind::ValueTooLarge(value))
}

fn to_word(value: u32) -> Result<u16, AssembleErrorKind> {
    u16::try_from(value).map_err(|_| AssembleErrorKind::ValueTooLarge(value))
}

fn supports(mnemonic: &str, mode: AddressingMode) -> bool {
    find_opcode(mnemonic, mode).is_some()
}

fn select_mode(
    mnemonic: &str,
    operand: &Operand,
    symbols: &Symbols,
    pc: u16,
) -> Result<AddressingMode, AssembleErrorKind> {
    use AddressingMode as M;

    if !is_official_mnemonic(mnemonic) {
        return Err(AssembleErrorKind::UnknownMnemonic(mnemonic.to_string()));
    }

    let unsupported = || AssembleErrorKind::UnsupportedAddressingMode(mnemonic.to_string());

    let mode = match operand {
        Operand::None if supports(mnemonic, M::Implicit) => M::Implicit,
        Operand::None | Operand::Accumulator => M::Accumulator,
        Operand::Immediate(..) => M::Immediate,
        Operand::Indirect(_) => M::Indirect,
        Operand::IndirectX(_) => M::IndirectX,
        Operand::IndirectY(_) => M::IndirectY,
        Operand::Direct(_, Index::None) if BRANCHES.contains(&mnemonic) => M::Relative,
        Operand::Direct(expr, index) => {
            let (zp, abs) = match index {
                Index::None => (M::ZeroPage, M::Absolute),
                Index::X => (M::ZeroPageX, M::AbsoluteX),
                Index::Y => (M::ZeroPageY, M::AbsoluteY),
            };
            let fits_zero_page = evaluate(expr, symbols, pc)?.is_some_and(|v| v <= 0xFF);

            if fits_zero_page && supports(mnemonic, zp) {
                zp
            } else if supports(mnemonic, abs) {
                abs
            } else {
                zp
            }
        }
    };

    if supports(mnemonic, mode) {
        Ok(mode)
    } else {
        Err(unsupported())
    }
}

#[allow(clippy::cast_possible_truncation)]
fn encode(
    mnemonic: &str,
    operand: &Operand,
    mode: AddressingMode,
    symbols: &Symbols,
    pc: u16,
) -> Result<Vec<u8>, AssembleErrorKind> {
    let opcode = find_opcode(mnemonic, mode)
        .ok_or_else(|| AssembleErrorKind::UnsupportedAddressingMode(mnemonic.to_string()))?;

    let value = match operand {
        Operand::None | Operand::Accumulator => return Ok(vec![opcode]),
        Operand::Immediate(expr, select) => {
            let v = require(expr, symbols, pc)?;
            match select {
                ByteSelect::Whole => v,
                ByteSelect::Low => v & 0xFF,
                ByteSelect::High => (v >> 8) & 0xFF,
            }
        }
        Operand::Indirect(expr)
        | Operand::IndirectX(expr)
        | Operand::IndirectY(expr)
        | Operand::Direct(expr, _) => require(expr, symbols, pc)?,
    };

    match mode.size() {
        1 => Ok(vec![opcode]),
        2 if mode == AddressingMode::Relative => {
            let target = to_word(value)?;
            let offset = i32::from(target) - (i32::from(pc) + 2);
            let Ok(offset) = i8::try_from(offset) else {
                return Err(AssembleErrorKind::BranchOutOfRange(target));
            };
            Ok(vec![opcode, offset as u8])
        }
        2 => Ok(vec![opcode, to_byte(value)?]),
        _ => {
            let [lo, hi] = to_word(value)?.to_le_bytes();
            Ok(vec![opcode, lo, hi])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_basic_modes() {
        // Arrange
        let src = "
            LDA #$01      ; immediate
            STA $D020     ; absolute
            LDX $FB       ; zero page
            LDA $0400,X
            LDA ($FB),Y
            JMP ($FFFC)
            ASL A
            ASL
            RTS
        ";

        // Act
        let res = assemble(src, 0xC000);

        // Assert
        assert_eq!(
            res,
            Ok(vec![
                0xA9, 0x01, 0x8D, 0x20, 0xD0, 0xA6, 0xFB, 0xBD, 0x00, 0x04, 0xB1, 0xFB, 0x6C,
                0xFC, 0xFF, 0x0A, 0x0A, 0x60
            ])
        );
    }

    #[test]
    fn test_assemble_labels_and_branches() {
        let src = "
        start:  LDX #$00
        loop:   INX
                BNE loop
                JMP start
                BEQ done
        done:   RTS
        ";

        let res = assemble(src, 0x1000);

        assert_eq!(
            res,
            Ok(vec![
                0xA2, 0x00, // LDX #$00
                0xE8, // INX
                0xD0, 0xFD, // BNE loop
                0x4C, 0x00, 0x10, // JMP start
                0xF0, 0x00, // BEQ done
                0x60, // RTS
            ])
        );
    }

    #[test]
    fn test_forward_reference_is_sized_absolute() {
        // `zp` is defined after use, so it is assembled as absolute
        let res = assemble("LDA zp\nzp = $10", 0);
        assert_eq!(res, Ok(vec![0xAD, 0x10, 0x00]));

        let res = assemble("zp = $10\nLDA zp", 0);
        assert_eq!(res, Ok(vec![0xA5, 0x10]));
    }

    #[test]
    fn test_number_formats_and_directives() {
        let src = "
            *= $2000
            .byte $01, 0x02, %11, 4
            LDA #<here
            LDX #>here
        here: NOP
        ";

        let res = assemble(src, 0);

        assert_eq!(res, Ok(vec![1, 2, 3, 4, 0xA9, 0x08, 0xA2, 0x20, 0xEA]));
    }

    #[test]
    fn test_assemble_without_spaces_and_lowercase() {
        assert_eq!(assemble("lda#$ff", 0), Ok(vec![0xA9, 0xFF]));
        assert_eq!(assemble("sta $10 , x", 0), Ok(vec![0x95, 0x10]));
    }

    #[test]
    fn test_assemble_errors() {
        assert_eq!(assemble("  ; nothing\n", 0), Err(AssembleError::Empty));
        assert_eq!(
            assemble("NOP\nFOO #1", 0),
            Err(AssembleError::Line(
                AssembleErrorKind::UnknownMnemonic("FOO".into()),
                2
            ))
        );
        assert_eq!(
            assemble("STA #$01", 0),
            Err(AssembleError::Line(
                AssembleErrorKind::UnsupportedAddressingMode("STA".into()),
                1
            ))
        );
        assert_eq!(
            assemble("JMP nowhere", 0),
            Err(AssembleError::Line(
                AssembleErrorKind::UndefinedLabel("nowhere".into()),
                1
            ))
        );
        assert_eq!(
            assemble("LDA #$100", 0),
            Err(AssembleError::Line(AssembleErrorKind::ValueTooLarge(0x100), 1))
        );
        assert_eq!(
            assemble("a: NOP\na: NOP", 0),
            Err(AssembleError::Line(
                AssembleErrorKind::DuplicateLabel("a".into()),
                2
            ))
        );
        assert_eq!(
            assemble("BNE $2000", 0x1000),
            Err(AssembleError::Line(
                AssembleErrorKind::BranchOutOfRange(0x2000),
                1
            ))
        );
    }
}
