//! The structured diagnostics produced by every phase of the pipeline.
//!
//! Every variant carries a [`LineInfo`] snapshot of the offending line plus
//! whatever payload identifies the problem. [`AssemblyError`] renders to a
//! single, uncolored, multi-line [`std::fmt::Display`] string; a caller that
//! wants color or a file-name prefix builds on top of that (see
//! [`crate::logging`]) rather than this module reaching for it itself.

use std::fmt;

use crate::assembler::ast::OperandKind;
use crate::assembler::symbol::SymbolParseError;
use crate::assembler::{MAX_INTEGER, MAX_LINE_LENGTH, MIN_INTEGER};

/// The source line an error was raised against.
#[derive(Debug, Clone)]
pub struct LineInfo {
    pub line_number: usize,
    pub text: String,
}

impl LineInfo {
    pub fn new(line_number: usize, text: &str) -> Self {
        LineInfo { line_number, text: text.to_string() }
    }
}

/// Failures raised while pre-expanding `mcro`/`mcroend` blocks.
#[derive(Debug, Clone)]
pub enum MacroError {
    InvalidName { reason: String },
    AlreadyDefined { name: String },
    DefinedAsLabel { name: String },
    LineTooLong { length: usize },
}

impl fmt::Display for MacroError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacroError::InvalidName { reason } => write!(f, "{}", reason),
            MacroError::AlreadyDefined { name } => {
                write!(f, "macro \"{}\" is already defined", name)
            }
            MacroError::DefinedAsLabel { name } => {
                write!(f, "\"{}\" is used as both a macro name and a label", name)
            }
            MacroError::LineTooLong { length } => write!(
                f,
                "line is {} characters long, maximum is {}",
                length, MAX_LINE_LENGTH
            ),
        }
    }
}

/// Failures raised while parsing the content of a single line.
#[derive(Debug, Clone)]
pub enum ParseError {
    ExpectedSpaceAfterLabel,
    ExpectedInstructionOrDirectiveAfterLabel,
    InvalidDirective { name: String },
    InvalidInstruction { name: String },
    TooManyOperands { expected: usize, found: usize },
    TooFewOperands { expected: usize, found: usize },
    UnexpectedCharactersAfterOperand,
    InvalidOperandType { op_index: usize, found: OperandKind, acceptable: &'static [OperandKind] },
    EmptyDataList,
    TrailingCommaInDataList,
    TrailingCommaAfterOperand,
    IntegerOverflow { text: String },
    InvalidInteger,
    InvalidString,
    MissingEntryExternSymbol,
    InvalidSymbol(SymbolParseError),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::ExpectedSpaceAfterLabel => write!(f, "expected whitespace after label"),
            ParseError::ExpectedInstructionOrDirectiveAfterLabel => {
                write!(f, "expected an instruction or directive after label")
            }
            ParseError::InvalidDirective { name } => write!(f, "unknown directive \".{}\"", name),
            ParseError::InvalidInstruction { name } => write!(f, "unknown instruction \"{}\"", name),
            ParseError::TooManyOperands { expected, found } => {
                write!(f, "too many operands: expected {}, found {}", expected, found)
            }
            ParseError::TooFewOperands { expected, found } => {
                write!(f, "too few operands: expected {}, found {}", expected, found)
            }
            ParseError::UnexpectedCharactersAfterOperand => {
                write!(f, "unexpected characters after operand")
            }
            ParseError::InvalidOperandType { op_index, found, acceptable } => write!(
                f,
                "operand {} has type {}, expected one of {:?}",
                op_index, found, acceptable
            ),
            ParseError::EmptyDataList => write!(f, "\".data\" requires at least one integer"),
            ParseError::TrailingCommaInDataList => write!(f, "trailing comma in \".data\" list"),
            ParseError::TrailingCommaAfterOperand => write!(f, "trailing comma after final operand"),
            ParseError::IntegerOverflow { text } => write!(
                f,
                "integer \"{}\" is out of range [{}, {}]",
                text, MIN_INTEGER, MAX_INTEGER
            ),
            ParseError::InvalidInteger => write!(f, "expected an integer"),
            ParseError::InvalidString => write!(f, "expected a quoted string"),
            ParseError::MissingEntryExternSymbol => write!(f, "expected a symbol name"),
            ParseError::InvalidSymbol(e) => write!(f, "invalid symbol: {}", e),
        }
    }
}

/// The complete error taxonomy produced by the pipeline.
#[derive(Debug, Clone)]
pub enum AssemblyError {
    Macro(MacroError, LineInfo),
    SymbolParse(SymbolParseError, LineInfo),
    Parse(ParseError, LineInfo),
    SymbolAlreadyDefined { name: String, previous_line: usize, info: LineInfo },
    MemoryOverflown(LineInfo),
    SymbolNotDefined { name: String, info: LineInfo },
    ExternalSymbolUsedInEntry { name: String, info: LineInfo },
}

impl std::error::Error for AssemblyError {}

impl fmt::Display for AssemblyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (info, message) = match self {
            AssemblyError::Macro(kind, info) => (info, kind.to_string()),
            AssemblyError::SymbolParse(kind, info) => (info, format!("invalid symbol: {}", kind)),
            AssemblyError::Parse(kind, info) => (info, kind.to_string()),
            AssemblyError::SymbolAlreadyDefined { name, previous_line, info } => (
                info,
                format!("symbol \"{}\" already defined at line {}", name, previous_line),
            ),
            AssemblyError::MemoryOverflown(info) => {
                (info, "memory image exceeds the addressable range".to_string())
            }
            AssemblyError::SymbolNotDefined { name, info } => {
                (info, format!("symbol \"{}\" is not defined", name))
            }
            AssemblyError::ExternalSymbolUsedInEntry { name, info } => (
                info,
                format!("external symbol \"{}\" cannot be declared as an entry", name),
            ),
        };
        writeln!(f, "error in line {}:", info.line_number)?;
        writeln!(f, "line: {}", info.text.trim())?;
        write!(f, "info: {}", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_a_readable_message() {
        let err = AssemblyError::SymbolNotDefined {
            name: "FOO".to_string(),
            info: LineInfo::new(4, "    jmp FOO"),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("line 4"));
        assert!(rendered.contains("FOO"));
    }
}
