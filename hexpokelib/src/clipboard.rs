//! Text form of byte ranges exchanged through the clipboard.
//!
//! Copy produces space separated uppercase hex pairs. Paste is tolerant: `0x` and `$`
//! prefixes and commas are ignored, whitespace is collapsed, and every token is read as
//! hex digit pairs. A trailing odd digit of a token is dropped.

use regex::Regex;

/// `[0x41, 0x42]` -> `"41 42"`
#[must_use]
pub fn encode(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strip prefixes and separators, leaving whitespace separated tokens
fn normalize(text: &str) -> String {
    let Ok(re) = Regex::new(r"0[xX]|\$|,") else {
        return text.to_string();
    };
    re.replace_all(text, " ").into_owned()
}

/// Parse pasted text into bytes. Tokens that are not hex are skipped.
///
/// # Example
/// ```
/// use hexpokelib::clipboard::decode;
///
/// assert_eq!(decode("0x41, $42 43"), vec![0x41, 0x42, 0x43]);
/// ```
#[must_use]
pub fn decode(text: &str) -> Vec<u8> {
    let normalized = normalize(text);
    let mut bytes = Vec::new();

    for token in normalized.split_whitespace() {
        if !token.chars().all(|c| c.is_ascii_hexdigit()) {
            continue;
        }
        for pair in token.as_bytes().chunks_exact(2) {
            // Both chars are ASCII hex digits
            if let Ok(s) = std::str::from_utf8(pair)
                && let Ok(b) = u8::from_str_radix(s, 16)
            {
                bytes.push(b);
            }
        }
    }

    bytes
}

/// 6502 mnemonics that are also valid hex digit strings
const HEX_SPELLED_MNEMONICS: [&str; 3] = ["ADC", "BCC", "DEC"];

/// Is `text` made only of hex digit tokens, of any length.
///
/// A line that opens with a mnemonic spelled in hex digits (`DEC $10`) is source code,
/// not bytes.
#[must_use]
pub fn looks_like_hex(text: &str) -> bool {
    let normalized = normalize(text);
    let mut tokens = normalized.split_whitespace().peekable();

    let opens_with_mnemonic = normalized.lines().any(|line| {
        line.split_whitespace().next().is_some_and(|first| {
            HEX_SPELLED_MNEMONICS
                .iter()
                .any(|m| m.eq_ignore_ascii_case(first))
        })
    });

    !opens_with_mnemonic
        && tokens.peek().is_some()
        && tokens.all(|t| t.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(encode(&[0x0A, 0xFF, 0x00]), "0A FF 00");
        assert_eq!(encode(&[]), "");
    }

    #[test]
    fn test_decode_tolerates_prefixes() {
        assert_eq!(decode("0x41, $42 43"), vec![0x41, 0x42, 0x43]);
        assert_eq!(decode("  de ad\n\tBEEF  "), vec![0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(decode("0X1,0x2"), Vec::<u8>::new());
    }

    #[test]
    fn test_decode_drops_odd_trailing_nibble() {
        assert_eq!(decode("ABC"), vec![0xAB]);
        assert_eq!(decode("12 3 45"), vec![0x12, 0x45]);
    }

    #[test]
    fn test_decode_skips_garbage_tokens() {
        assert_eq!(decode("LDA #01 EA"), vec![0xEA]);
        assert!(decode("").is_empty());
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let bytes: Vec<u8> = (0..=255).collect();
        assert_eq!(decode(&encode(&bytes)), bytes);
    }

    #[test]
    fn test_looks_like_hex() {
        assert!(looks_like_hex("A9 01 8D 20 D0"));
        assert!(looks_like_hex("$A9, $01"));
        assert!(!looks_like_hex("LDA #$01"));
        assert!(!looks_like_hex("DEC 10"));
        assert!(!looks_like_hex("lda #1\nbcc $C000"));
        assert!(!looks_like_hex("   "));
    }

    #[test]
    fn test_looks_like_hex_accepts_odd_tokens() {
        assert!(looks_like_hex("A9 01 E"));
        assert!(looks_like_hex("ABC"));
        assert!(looks_like_hex("DE AD BE EF"));
    }
}
