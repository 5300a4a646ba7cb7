//! Symbol-name scanning and validation, shared by labels, operands and
//! `.entry`/`.extern` directives.

use std::fmt;

use crate::assembler::keywords;
use crate::assembler::MAX_LABEL_LEN;

/// Why a candidate symbol name was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolParseError {
    Empty,
    StartsWithNonAlpha,
    InvalidCharacter { pos: usize, ch: char },
    TooLong { length: usize },
    IsDirective,
    IsInstruction,
    IsRegister,
}

impl fmt::Display for SymbolParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolParseError::Empty => write!(f, "expected a symbol name"),
            SymbolParseError::StartsWithNonAlpha => {
                write!(f, "symbol name must start with a letter")
            }
            SymbolParseError::InvalidCharacter { pos, ch } => {
                write!(f, "invalid character '{}' at position {}", ch, pos)
            }
            SymbolParseError::TooLong { length } => write!(
                f,
                "symbol name is {} characters long, maximum is {}",
                length, MAX_LABEL_LEN
            ),
            SymbolParseError::IsDirective => {
                write!(f, "symbol name collides with a directive name")
            }
            SymbolParseError::IsInstruction => {
                write!(f, "symbol name collides with an instruction name")
            }
            SymbolParseError::IsRegister => {
                write!(f, "symbol name collides with a register name")
            }
        }
    }
}

/// Outcome of scanning for a label (a symbol terminated by `:`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolParseOutcome {
    /// No `:` was found anywhere on the line: there is no label here.
    NoSymbol,
    Ok(String),
    Err(SymbolParseError),
}

/// Validate a symbol candidate that has already been isolated (no scanning).
///
/// The candidate is scanned to completion before any error is decided: a
/// character-level error found later in the string overrides one found
/// earlier (so among several invalid characters, the last one is what gets
/// reported), and a too-long name overrides any character-level error
/// entirely. Reserved-word checks only apply once the scan found no
/// character-level error.
pub fn classify(candidate: &str) -> Result<(), SymbolParseError> {
    if candidate.is_empty() {
        return Err(SymbolParseError::Empty);
    }

    let mut char_error = None;
    let mut indices = candidate.char_indices();
    let (_, first) = indices.next().unwrap();
    if !first.is_ascii_alphabetic() {
        char_error = Some(SymbolParseError::StartsWithNonAlpha);
    }
    for (pos, ch) in indices {
        if !ch.is_ascii_alphanumeric() {
            char_error = Some(SymbolParseError::InvalidCharacter { pos, ch });
        }
    }

    let length = candidate.chars().count();
    if length > MAX_LABEL_LEN {
        return Err(SymbolParseError::TooLong { length });
    }
    if let Some(e) = char_error {
        return Err(e);
    }

    if keywords::lookup_directive(candidate).is_some() {
        return Err(SymbolParseError::IsDirective);
    }
    if keywords::lookup_instruction(candidate).is_some() {
        return Err(SymbolParseError::IsInstruction);
    }
    if keywords::register_index(candidate).is_some() {
        return Err(SymbolParseError::IsRegister);
    }
    Ok(())
}

/// Scan a label at the start of `s`, terminated by the first `:` on the line.
/// Returns the outcome and the byte offset of the terminator (valid only
/// when the outcome is not `NoSymbol`).
pub fn parse_label(s: &str) -> (SymbolParseOutcome, usize) {
    match s.find(':') {
        None => (SymbolParseOutcome::NoSymbol, 0),
        Some(end) => {
            let candidate = &s[..end];
            let outcome = match classify(candidate) {
                Ok(()) => SymbolParseOutcome::Ok(candidate.to_string()),
                Err(e) => SymbolParseOutcome::Err(e),
            };
            (outcome, end)
        }
    }
}

/// Scan a bare symbol (operand, `.entry`/`.extern` argument) terminated by
/// the first character matching `stop`, or end of string.
pub fn parse_bare(s: &str, stop: impl Fn(char) -> bool) -> (SymbolParseOutcome, usize) {
    let end = s.find(stop).unwrap_or(s.len());
    let candidate = &s[..end];
    let outcome = match classify(candidate) {
        Ok(()) => SymbolParseOutcome::Ok(candidate.to_string()),
        Err(e) => SymbolParseOutcome::Err(e),
    };
    (outcome, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_with_no_colon_is_no_symbol() {
        let (outcome, _) = parse_label("mov #3, r1");
        assert_eq!(outcome, SymbolParseOutcome::NoSymbol);
    }

    #[test]
    fn valid_label() {
        let (outcome, end) = parse_label("LOOP: inc r1");
        assert_eq!(outcome, SymbolParseOutcome::Ok("LOOP".to_string()));
        assert_eq!(end, 4);
    }

    #[test]
    fn label_colliding_with_instruction() {
        let (outcome, _) = parse_label("mov: inc r1");
        assert_eq!(outcome, SymbolParseOutcome::Err(SymbolParseError::IsInstruction));
    }

    #[test]
    fn too_long_symbol() {
        let long = "a".repeat(32);
        assert_eq!(classify(&long), Err(SymbolParseError::TooLong { length: 32 }));
        let ok = "a".repeat(31);
        assert_eq!(classify(&ok), Ok(()));
    }

    #[test]
    fn too_long_overrides_a_bad_first_character() {
        // Starts with a digit (invalid) and is also 32 characters long:
        // the length check wins, not `StartsWithNonAlpha`.
        let candidate = format!("1{}", "a".repeat(31));
        assert_eq!(candidate.chars().count(), 32);
        assert_eq!(classify(&candidate), Err(SymbolParseError::TooLong { length: 32 }));
    }

    #[test]
    fn last_invalid_character_wins_over_the_first() {
        let outcome = classify("a!b$c");
        match outcome {
            Err(SymbolParseError::InvalidCharacter { ch, .. }) => assert_eq!(ch, '$'),
            other => panic!("expected InvalidCharacter('$'), got {:?}", other),
        }
    }

    #[test]
    fn last_invalid_character_overrides_a_bad_first_character() {
        // First character is invalid, but a later one is too; the later
        // one is what gets reported (scanning never stops at the first).
        let outcome = classify("1ab$c");
        match outcome {
            Err(SymbolParseError::InvalidCharacter { ch, .. }) => assert_eq!(ch, '$'),
            other => panic!("expected InvalidCharacter('$'), got {:?}", other),
        }
    }

    #[test]
    fn reserved_word_check_is_skipped_when_a_character_error_exists() {
        // "mov!" collides with nothing once its invalid character is
        // accounted for, but the character error takes priority anyway.
        let outcome = classify("mov!");
        assert!(matches!(outcome, Err(SymbolParseError::InvalidCharacter { ch: '!', .. })));
    }

    #[test]
    fn bare_symbol_stops_at_comma_or_end() {
        let (outcome, end) = parse_bare("FOO, r1", |c| c == ',' || c.is_whitespace());
        assert_eq!(outcome, SymbolParseOutcome::Ok("FOO".to_string()));
        assert_eq!(end, 3);
    }
}
