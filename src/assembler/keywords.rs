//! Reserved-word tables: instructions, directives and register names.

use crate::assembler::ast::Opcode;

const INSTRUCTIONS: &[(&str, Opcode)] = &[
    ("mov", Opcode::Mov),
    ("cmp", Opcode::Cmp),
    ("add", Opcode::Add),
    ("sub", Opcode::Sub),
    ("lea", Opcode::Lea),
    ("clr", Opcode::Clr),
    ("not", Opcode::Not),
    ("inc", Opcode::Inc),
    ("dec", Opcode::Dec),
    ("jmp", Opcode::Jmp),
    ("bne", Opcode::Bne),
    ("jsr", Opcode::Jsr),
    ("red", Opcode::Red),
    ("prn", Opcode::Prn),
    ("rts", Opcode::Rts),
    ("stop", Opcode::Stop),
];

const DIRECTIVES: &[&str] = &["data", "string", "entry", "extern"];

/// Look up an instruction mnemonic, case-sensitive (the source language is).
pub fn lookup_instruction(name: &str) -> Option<Opcode> {
    INSTRUCTIONS.iter().find(|(n, _)| *n == name).map(|(_, op)| *op)
}

/// Look up a directive name without its leading dot.
pub fn lookup_directive(name: &str) -> Option<&'static str> {
    DIRECTIVES.iter().find(|&&n| n == name).copied()
}

/// Recognize `r0`..`r7`, returning the register index.
pub fn register_index(token: &str) -> Option<u8> {
    let mut chars = token.chars();
    if chars.next()? != 'r' {
        return None;
    }
    let rest: Vec<char> = chars.collect();
    if rest.len() != 1 {
        return None;
    }
    let digit = rest[0].to_digit(10)?;
    if digit < 8 {
        Some(digit as u8)
    } else {
        None
    }
}
