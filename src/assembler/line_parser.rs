//! Single-line recognizer: labels, directives, instructions.

use crate::assembler::ast::{Directive, Instruction, Operand};
use crate::assembler::errors::ParseError;
use crate::assembler::keywords;
use crate::assembler::lexer;
use crate::assembler::symbol::{self, SymbolParseError, SymbolParseOutcome};
use crate::assembler::{MAX_INTEGER, MIN_INTEGER};

/// What a line contains, once a possible label has been peeled off.
#[derive(Debug)]
pub enum LineContent {
    Empty,
    Comment,
    Directive(Directive),
    Instruction(Instruction),
    Error(ParseError),
}

/// The full result of parsing one line.
#[derive(Debug)]
pub struct ParsedLine {
    pub label: Option<String>,
    pub label_error: Option<SymbolParseError>,
    pub content: LineContent,
}

pub fn parse_line(raw_line: &str) -> ParsedLine {
    let trimmed_start = lexer::skip_space(raw_line);
    if trimmed_start.is_empty() {
        return ParsedLine { label: None, label_error: None, content: LineContent::Empty };
    }
    if trimmed_start.starts_with(';') {
        return ParsedLine { label: None, label_error: None, content: LineContent::Comment };
    }

    let mut label = None;
    let mut label_error = None;
    let mut rest = trimmed_start;

    let mut found_label = false;
    match symbol::parse_label(rest) {
        (SymbolParseOutcome::Ok(name), end) => {
            label = Some(name);
            rest = &rest[end + 1..];
            found_label = true;
        }
        (SymbolParseOutcome::Err(e), end) => {
            label_error = Some(e);
            rest = &rest[end + 1..];
            found_label = true;
        }
        (SymbolParseOutcome::NoSymbol, _) => {}
    }
    if found_label && !rest.is_empty() && !rest.starts_with(|c: char| c.is_whitespace()) {
        return ParsedLine {
            label,
            label_error,
            content: LineContent::Error(ParseError::ExpectedSpaceAfterLabel),
        };
    }

    let after_label = lexer::skip_space(rest);
    if after_label.is_empty() {
        if label.is_some() || label_error.is_some() {
            return ParsedLine {
                label,
                label_error,
                content: LineContent::Error(ParseError::ExpectedInstructionOrDirectiveAfterLabel),
            };
        }
        return ParsedLine { label, label_error, content: LineContent::Empty };
    }

    let content = if after_label.starts_with('.') {
        parse_directive(after_label)
    } else {
        parse_instruction(after_label)
    };

    ParsedLine { label, label_error, content }
}

fn parse_directive(s: &str) -> LineContent {
    let body = &s[1..];
    let name_end = body.find(|c: char| !c.is_ascii_alphabetic()).unwrap_or(body.len());
    let name = &body[..name_end];
    let rest = &body[name_end..];
    if keywords::lookup_directive(name).is_none() {
        return LineContent::Error(ParseError::InvalidDirective { name: name.to_string() });
    }
    if !rest.is_empty() && !rest.starts_with(|c: char| c.is_whitespace()) {
        return LineContent::Error(ParseError::InvalidDirective { name: name.to_string() });
    }
    match name {
        "data" => parse_data(rest),
        "string" => parse_string_directive(rest),
        "entry" => parse_entry_extern(rest, true),
        "extern" => parse_entry_extern(rest, false),
        _ => unreachable!(),
    }
}

fn parse_integer_literal(s: &str) -> Result<(i32, usize), ParseError> {
    match lexer::parse_i32_base10(s) {
        Some(lit) => {
            if lit.overflow || lit.value > MAX_INTEGER || lit.value < MIN_INTEGER {
                Err(ParseError::IntegerOverflow { text: s[..lit.consumed].to_string() })
            } else {
                Ok((lit.value, lit.consumed))
            }
        }
        None => Err(ParseError::InvalidInteger),
    }
}

fn parse_data(rest: &str) -> LineContent {
    let mut remaining = lexer::skip_space(rest);
    if remaining.is_empty() {
        return LineContent::Error(ParseError::EmptyDataList);
    }
    let mut values = Vec::new();
    loop {
        remaining = lexer::skip_space(remaining);
        match parse_integer_literal(remaining) {
            Ok((value, consumed)) => {
                values.push(value);
                remaining = &remaining[consumed..];
            }
            Err(e) => return LineContent::Error(e),
        }
        remaining = lexer::skip_space(remaining);
        if let Some(after_comma) = remaining.strip_prefix(',') {
            remaining = after_comma;
            if lexer::skip_space(remaining).is_empty() {
                return LineContent::Error(ParseError::TrailingCommaInDataList);
            }
            continue;
        }
        break;
    }
    if !lexer::skip_space(remaining).is_empty() {
        return LineContent::Error(ParseError::UnexpectedCharactersAfterOperand);
    }
    LineContent::Directive(Directive::Data(values))
}

fn parse_string_directive(rest: &str) -> LineContent {
    let rest = lexer::skip_space(rest);
    if !rest.starts_with('"') {
        return LineContent::Error(ParseError::InvalidString);
    }
    let body = &rest[1..];
    match body.find('"') {
        None => LineContent::Error(ParseError::InvalidString),
        Some(end) => {
            let text = &body[..end];
            let trailing = &body[end + 1..];
            if !lexer::skip_space(trailing).is_empty() {
                return LineContent::Error(ParseError::UnexpectedCharactersAfterOperand);
            }
            LineContent::Directive(Directive::String(text.to_string()))
        }
    }
}

fn parse_entry_extern(rest: &str, is_entry: bool) -> LineContent {
    let rest = lexer::skip_space(rest);
    let (outcome, end) = symbol::parse_bare(rest, |c| c.is_whitespace());
    match outcome {
        SymbolParseOutcome::Ok(name) => {
            let trailing = lexer::skip_space(&rest[end..]);
            if !trailing.is_empty() {
                return LineContent::Error(ParseError::UnexpectedCharactersAfterOperand);
            }
            if is_entry {
                LineContent::Directive(Directive::Entry(name))
            } else {
                LineContent::Directive(Directive::Extern(name))
            }
        }
        SymbolParseOutcome::Err(SymbolParseError::Empty) => {
            LineContent::Error(ParseError::MissingEntryExternSymbol)
        }
        SymbolParseOutcome::Err(e) => LineContent::Error(ParseError::InvalidSymbol(e)),
        SymbolParseOutcome::NoSymbol => LineContent::Error(ParseError::MissingEntryExternSymbol),
    }
}

fn parse_instruction(s: &str) -> LineContent {
    let end = s.find(|c: char| c.is_whitespace()).unwrap_or(s.len());
    let name = &s[..end];
    let opcode = match keywords::lookup_instruction(name) {
        Some(op) => op,
        None => return LineContent::Error(ParseError::InvalidInstruction { name: name.to_string() }),
    };
    let rest = lexer::skip_space(&s[end..]);
    parse_operands(opcode, rest)
}

fn parse_operand(s: &str) -> Result<(Operand, usize), ParseError> {
    if let Some(rest) = s.strip_prefix('#') {
        let (value, consumed) = parse_integer_literal(rest)?;
        Ok((Operand::Immediate(value), 1 + consumed))
    } else if let Some(rest) = s.strip_prefix('&') {
        let end = rest.find(|c: char| c.is_whitespace() || c == ',').unwrap_or(rest.len());
        let name = &rest[..end];
        symbol::classify(name)
            .map(|()| (Operand::Address(name.to_string()), 1 + end))
            .map_err(ParseError::InvalidSymbol)
    } else {
        let end = s.find(|c: char| c.is_whitespace() || c == ',').unwrap_or(s.len());
        let token = &s[..end];
        if let Some(reg) = keywords::register_index(token) {
            return Ok((Operand::Register(reg), end));
        }
        symbol::classify(token)
            .map(|()| (Operand::Symbol(token.to_string()), end))
            .map_err(ParseError::InvalidSymbol)
    }
}

fn parse_operands(opcode: crate::assembler::ast::Opcode, rest: &str) -> LineContent {
    let expected = opcode.operand_count();
    let mut operands = Vec::new();
    let mut remaining = rest;

    loop {
        remaining = lexer::skip_space(remaining);
        if remaining.is_empty() {
            break;
        }
        match parse_operand(remaining) {
            Ok((operand, consumed)) => {
                operands.push(operand);
                remaining = &remaining[consumed..];
            }
            Err(e) => return LineContent::Error(e),
        }
        remaining = lexer::skip_space(remaining);
        if let Some(after) = remaining.strip_prefix(',') {
            remaining = after;
            if lexer::skip_space(remaining).is_empty() {
                return LineContent::Error(ParseError::TrailingCommaAfterOperand);
            }
            continue;
        }
        break;
    }

    if !lexer::skip_space(remaining).is_empty() {
        return LineContent::Error(ParseError::UnexpectedCharactersAfterOperand);
    }
    if operands.len() < expected {
        return LineContent::Error(ParseError::TooFewOperands { expected, found: operands.len() });
    }
    if operands.len() > expected {
        return LineContent::Error(ParseError::TooManyOperands { expected, found: operands.len() });
    }

    if expected == 1 {
        let dst = &operands[0];
        if !opcode.dst_acceptable().contains(&dst.kind()) {
            return LineContent::Error(ParseError::InvalidOperandType {
                op_index: 1,
                found: dst.kind(),
                acceptable: opcode.dst_acceptable(),
            });
        }
    } else if expected == 2 {
        let src = &operands[0];
        let dst = &operands[1];
        if !opcode.src_acceptable().contains(&src.kind()) {
            return LineContent::Error(ParseError::InvalidOperandType {
                op_index: 1,
                found: src.kind(),
                acceptable: opcode.src_acceptable(),
            });
        }
        if !opcode.dst_acceptable().contains(&dst.kind()) {
            return LineContent::Error(ParseError::InvalidOperandType {
                op_index: 2,
                found: dst.kind(),
                acceptable: opcode.dst_acceptable(),
            });
        }
    }

    LineContent::Instruction(Instruction { opcode, operands })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::ast::Opcode;

    #[test]
    fn parses_a_labeled_instruction() {
        let parsed = parse_line("MAIN: mov #3, r1");
        assert_eq!(parsed.label.as_deref(), Some("MAIN"));
        match parsed.content {
            LineContent::Instruction(instr) => {
                assert_eq!(instr.opcode, Opcode::Mov);
                assert_eq!(instr.operands.len(), 2);
            }
            other => panic!("expected instruction, got {:?}", other),
        }
    }

    #[test]
    fn empty_and_comment_lines() {
        assert!(matches!(parse_line("").content, LineContent::Empty));
        assert!(matches!(parse_line("   ").content, LineContent::Empty));
        assert!(matches!(parse_line("  ; a comment").content, LineContent::Comment));
    }

    #[test]
    fn parses_data_directive() {
        let parsed = parse_line("LST: .data 7, -3, 2097151");
        match parsed.content {
            LineContent::Directive(Directive::Data(values)) => {
                assert_eq!(values, vec![7, -3, 2097151]);
            }
            other => panic!("expected data directive, got {:?}", other),
        }
    }

    #[test]
    fn rejects_integer_overflow() {
        let parsed = parse_line(".data 2097152");
        assert!(matches!(parsed.content, LineContent::Error(ParseError::IntegerOverflow { .. })));
    }

    #[test]
    fn rejects_non_space_immediately_after_directive_name() {
        let parsed = parse_line(".data,7");
        assert!(matches!(parsed.content, LineContent::Error(ParseError::InvalidDirective { .. })));
    }

    #[test]
    fn rejects_trailing_comma_after_final_operand() {
        let parsed = parse_line("clr r1,");
        assert!(matches!(parsed.content, LineContent::Error(ParseError::TrailingCommaAfterOperand)));

        let parsed = parse_line("mov r1, r2,");
        assert!(matches!(parsed.content, LineContent::Error(ParseError::TrailingCommaAfterOperand)));
    }

    #[test]
    fn parses_string_directive() {
        let parsed = parse_line(r#"STR: .string "ab""#);
        match parsed.content {
            LineContent::Directive(Directive::String(s)) => assert_eq!(s, "ab"),
            other => panic!("expected string directive, got {:?}", other),
        }
    }

    #[test]
    fn reports_offending_destination_operand() {
        let parsed = parse_line("lea #3, r1");
        match parsed.content {
            LineContent::Error(ParseError::InvalidOperandType { op_index, .. }) => {
                assert_eq!(op_index, 1);
            }
            other => panic!("expected an operand-type error, got {:?}", other),
        }
    }

    #[test]
    fn reports_second_operand_as_offender_when_first_is_valid() {
        // lea takes a symbol source and a symbol-or-register destination;
        // an immediate destination is the actual offender here, not operand 1.
        let parsed = parse_line("lea LABEL, #3");
        match parsed.content {
            LineContent::Error(ParseError::InvalidOperandType { op_index, .. }) => {
                assert_eq!(op_index, 2);
            }
            other => panic!("expected an operand-type error, got {:?}", other),
        }
    }

    #[test]
    fn requires_space_after_label() {
        let parsed = parse_line("FOO:mov r1, r2");
        assert!(matches!(parsed.content, LineContent::Error(ParseError::ExpectedSpaceAfterLabel)));
    }

    #[test]
    fn requires_space_after_an_errored_label_too() {
        // "1ab" is an invalid label (starts with a digit), but the missing
        // space after ':' must still be reported as its own content error
        // instead of letting the rest of the line parse as an instruction.
        let parsed = parse_line("1ab:stop");
        assert!(parsed.label_error.is_some());
        assert!(matches!(parsed.content, LineContent::Error(ParseError::ExpectedSpaceAfterLabel)));
    }
}
