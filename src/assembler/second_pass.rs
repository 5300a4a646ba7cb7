//! Second pass: instruction encoding, symbol resolution, entry/extern lists.

use std::collections::HashSet;

use crate::assembler::ast::{Directive, Operand};
use crate::assembler::encode;
use crate::assembler::errors::{AssemblyError, LineInfo};
use crate::assembler::line_parser::{self, LineContent};
use crate::assembler::symbol_table::{SymbolContext, SymbolTable};
use crate::assembler::{Address, Word, INSTRUCTION_START};

pub struct SecondPassOutput {
    pub instruction_image: Vec<Word>,
    pub entry_list: Vec<(String, Address)>,
    pub external_refs: Vec<(String, Address)>,
    pub errors: Vec<AssemblyError>,
}

pub fn run(source: &str, symbols: &SymbolTable) -> SecondPassOutput {
    let mut instruction_image = Vec::new();
    let mut entry_list = Vec::new();
    let mut entry_seen: HashSet<String> = HashSet::new();
    let mut external_refs = Vec::new();
    let mut errors = Vec::new();
    let mut ic: Address = INSTRUCTION_START;

    for (idx, raw_line) in source.lines().enumerate() {
        let line_number = idx + 1;
        let parsed = line_parser::parse_line(raw_line);

        match parsed.content {
            LineContent::Directive(Directive::Entry(name)) => match symbols.get(&name) {
                None => errors.push(AssemblyError::SymbolNotDefined {
                    name,
                    info: LineInfo::new(line_number, raw_line),
                }),
                Some(sym) if sym.context == SymbolContext::External => {
                    errors.push(AssemblyError::ExternalSymbolUsedInEntry {
                        name,
                        info: LineInfo::new(line_number, raw_line),
                    });
                }
                Some(sym) => {
                    if entry_seen.insert(name.clone()) {
                        entry_list.push((name, sym.addr));
                    }
                }
            },
            LineContent::Instruction(instr) => {
                let head_addr = ic;
                let (src, dst) = instr.source_and_destination();
                let mut extras: Vec<Word> = Vec::new();
                let mut resolved_ok = true;

                for operand in [src, dst].into_iter().flatten() {
                    match operand {
                        Operand::Register(_) => {}
                        Operand::Immediate(v) => extras.push(encode::immediate_extra_word(*v)),
                        Operand::Symbol(name) => match symbols.get(name) {
                            None => {
                                errors.push(AssemblyError::SymbolNotDefined {
                                    name: name.clone(),
                                    info: LineInfo::new(line_number, raw_line),
                                });
                                resolved_ok = false;
                            }
                            Some(sym) => {
                                if sym.context == SymbolContext::External {
                                    let word_addr = head_addr + 1 + extras.len() as Address;
                                    external_refs.push((name.clone(), word_addr));
                                }
                                extras.push(encode::symbol_extra_word(sym.addr, sym.context));
                            }
                        },
                        Operand::Address(name) => match symbols.get(name) {
                            None => {
                                errors.push(AssemblyError::SymbolNotDefined {
                                    name: name.clone(),
                                    info: LineInfo::new(line_number, raw_line),
                                });
                                resolved_ok = false;
                            }
                            Some(sym) => {
                                if sym.context == SymbolContext::External {
                                    let word_addr = head_addr + 1 + extras.len() as Address;
                                    external_refs.push((name.clone(), word_addr));
                                }
                                extras.push(encode::address_extra_word(sym.addr, head_addr));
                            }
                        },
                    }
                }

                if resolved_ok {
                    instruction_image.push(encode::head_word(instr.opcode, src, dst));
                    instruction_image.extend(extras);
                }
                ic += instr.word_count() as Address;
            }
            LineContent::Error(_)
            | LineContent::Directive(Directive::Extern(_))
            | LineContent::Directive(Directive::Data(_))
            | LineContent::Directive(Directive::String(_))
            | LineContent::Empty
            | LineContent::Comment => {}
        }
    }

    SecondPassOutput { instruction_image, entry_list, external_refs, errors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::first_pass;

    #[test]
    fn resolves_extern_reference_and_entry() {
        let source = ".extern EXT\nENTRYHERE: add EXT, r2\n.entry ENTRYHERE\n";
        let first = first_pass::run(source);
        assert!(first.errors.is_empty());
        let second = run(source, &first.symbols);
        assert!(second.errors.is_empty());
        assert_eq!(second.entry_list, vec![("ENTRYHERE".to_string(), 100)]);
        assert_eq!(second.external_refs, vec![("EXT".to_string(), 101)]);
    }

    #[test]
    fn rejects_external_symbol_used_as_entry() {
        let source = ".extern E\n.entry E\n";
        let first = first_pass::run(source);
        let second = run(source, &first.symbols);
        assert_eq!(second.errors.len(), 1);
        assert!(matches!(second.errors[0], AssemblyError::ExternalSymbolUsedInEntry { ref name, .. } if name == "E"));
    }

    #[test]
    fn dedupes_repeated_entry_declarations() {
        let source = "A: stop\n.entry A\n.entry A\n";
        let first = first_pass::run(source);
        let second = run(source, &first.symbols);
        assert_eq!(second.entry_list.len(), 1);
    }

    #[test]
    fn reports_undefined_symbol() {
        let source = "jmp NOWHERE\n";
        let first = first_pass::run(source);
        let second = run(source, &first.symbols);
        assert_eq!(second.errors.len(), 1);
        assert!(matches!(second.errors[0], AssemblyError::SymbolNotDefined { ref name, .. } if name == "NOWHERE"));
    }

    #[test]
    fn encodes_simple_program() {
        let source = "MAIN: mov #3, r1\nstop\n";
        let first = first_pass::run(source);
        let second = run(source, &first.symbols);
        assert!(second.errors.is_empty());
        assert_eq!(second.instruction_image.len(), 3);
        assert_eq!(second.instruction_image[2] >> 18, 15); // stop opcode
    }
}
