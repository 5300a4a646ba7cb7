//! Converts assembly source for a 24-bit word-addressed machine into a
//! translation unit's object image, in a two-pass manner.
//!
//! The pipeline has three stages:
//! 1. [`macros`] pre-expands `mcro`/`mcroend` blocks textually.
//! 2. [`first_pass`] collects labels into a [`symbol_table::SymbolTable`]
//!    and builds the data image contributed by `.data`/`.string`.
//! 3. [`second_pass`] encodes every instruction into words, resolving
//!    symbol references and collecting the `.entry`/`.extern` lists.
//!
//! Labels, instructions and directives can be indented as you wish. Labels
//! are case-sensitive; instructions and directives are not (and in this
//! language are always written lowercase). Comments start with `;` and run
//! to the end of the line.
//!
//! ```ignore
//! MAIN:   mov   #3, r1
//!         add   r1, r2
//!         jmp   LOOP
//! LOOP:   dec   r2
//!         bne   LOOP
//!         stop
//! ```
//!
//! The assembler supports 16 instructions (`mov, cmp, add, sub, lea, clr,
//! not, inc, dec, jmp, bne, jsr, red, prn, rts, stop`) and four directives
//! (`.data, .string, .entry, .extern`).
//!
//! A run that produces no diagnostics is a "clean run"; only a clean run's
//! images are meaningful to write out (see [`AssembleOutcome::is_clean`]).

pub mod ast;
pub mod encode;
pub mod errors;
pub mod first_pass;
pub mod keywords;
pub mod lexer;
pub mod line_parser;
pub mod macros;
pub mod second_pass;
pub mod symbol;
pub mod symbol_table;

use std::fs;
use std::io;
use std::path::Path;

pub use errors::AssemblyError;

/// A 24-bit machine word, stored in the low 24 bits of a `u32`.
pub type Word = u32;
/// A memory address, in the range `[0, MAX_ADDRESS]`.
pub type Address = u32;

pub const INSTRUCTION_START: Address = 100;
pub const MAX_ADDRESS: Address = 0x1F_FFFF;
pub const MAX_INTEGER: i32 = 2_097_151;
pub const MIN_INTEGER: i32 = -2_097_152;
pub const MAX_LABEL_LEN: usize = 31;
pub const MAX_LINE_LENGTH: usize = 80;

/// The result of running the full pipeline over one translation unit.
#[derive(Debug)]
pub struct AssembleOutcome {
    pub instruction_image: Vec<Word>,
    pub data_image: Vec<Word>,
    pub entry_list: Vec<(String, Address)>,
    pub external_refs: Vec<(String, Address)>,
    pub errors: Vec<AssemblyError>,
}

impl AssembleOutcome {
    /// A clean run is the only kind whose images are meaningful to emit.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Run the full macro-expansion / first-pass / second-pass pipeline over
/// `source`, accumulating diagnostics from every phase that still ran.
pub fn assemble(source: &str) -> AssembleOutcome {
    let (expanded, mut errors) = macros::expand(source);
    if !errors.is_empty() {
        return AssembleOutcome {
            instruction_image: Vec::new(),
            data_image: Vec::new(),
            entry_list: Vec::new(),
            external_refs: Vec::new(),
            errors,
        };
    }

    let first = first_pass::run(&expanded);
    errors.extend(first.errors);

    let second = second_pass::run(&expanded, &first.symbols);
    errors.extend(second.errors);

    AssembleOutcome {
        instruction_image: second.instruction_image,
        data_image: first.data_image,
        entry_list: second.entry_list,
        external_refs: second.external_refs,
        errors,
    }
}

/// Read `path` and run [`assemble`] over its contents.
pub fn assemble_from_file(path: impl AsRef<Path>) -> io::Result<AssembleOutcome> {
    let source = fs::read_to_string(path)?;
    Ok(assemble(&source))
}
