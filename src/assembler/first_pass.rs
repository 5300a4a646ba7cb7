//! First pass: label collection, data image construction, address counters.

use crate::assembler::ast::Directive;
use crate::assembler::errors::{AssemblyError, LineInfo};
use crate::assembler::line_parser::{self, LineContent};
use crate::assembler::symbol_table::{Symbol, SymbolContext, SymbolTable};
use crate::assembler::{Address, Word, INSTRUCTION_START, MAX_ADDRESS};

pub struct FirstPassOutput {
    pub symbols: SymbolTable,
    pub data_image: Vec<Word>,
    pub errors: Vec<AssemblyError>,
}

pub fn run(source: &str) -> FirstPassOutput {
    let mut symbols = SymbolTable::new();
    let mut data_image: Vec<Word> = Vec::new();
    let mut errors = Vec::new();
    let mut ic: Address = INSTRUCTION_START;
    let mut dc: Address = 0;
    let mut overflow_at: Option<LineInfo> = None;

    for (idx, raw_line) in source.lines().enumerate() {
        let line_number = idx + 1;
        let parsed = line_parser::parse_line(raw_line);

        if let Some(err) = parsed.label_error {
            errors.push(AssemblyError::SymbolParse(err, LineInfo::new(line_number, raw_line)));
        }

        match parsed.content {
            LineContent::Empty | LineContent::Comment => continue,
            LineContent::Error(e) => {
                errors.push(AssemblyError::Parse(e, LineInfo::new(line_number, raw_line)));
                continue;
            }
            LineContent::Directive(Directive::Extern(name)) => {
                if let Some(existing) = symbols.get(&name) {
                    errors.push(AssemblyError::SymbolAlreadyDefined {
                        name,
                        previous_line: existing.defining_line,
                        info: LineInfo::new(line_number, raw_line),
                    });
                } else {
                    symbols.insert(Symbol {
                        name,
                        addr: 0,
                        context: SymbolContext::External,
                        defining_line: line_number,
                    });
                }
            }
            LineContent::Directive(Directive::Entry(_)) => {
                // resolved in the second pass, once all symbols are known
            }
            LineContent::Directive(Directive::Data(values)) => {
                if let Some(label) = parsed.label {
                    try_insert_label(&mut symbols, label, dc, SymbolContext::Data, line_number, raw_line, &mut errors);
                }
                for v in &values {
                    data_image.push((*v as i64 & 0xFF_FFFF) as Word);
                }
                dc += values.len() as Address;
            }
            LineContent::Directive(Directive::String(text)) => {
                if let Some(label) = parsed.label {
                    try_insert_label(&mut symbols, label, dc, SymbolContext::Data, line_number, raw_line, &mut errors);
                }
                for ch in text.chars() {
                    data_image.push(ch as Word);
                }
                data_image.push(0);
                dc += text.chars().count() as Address + 1;
            }
            LineContent::Instruction(instr) => {
                if let Some(label) = parsed.label {
                    try_insert_label(&mut symbols, label, ic, SymbolContext::Code, line_number, raw_line, &mut errors);
                }
                ic += instr.word_count() as Address;
            }
        }

        if overflow_at.is_none() && ic + dc > MAX_ADDRESS {
            overflow_at = Some(LineInfo::new(line_number, raw_line));
        }
    }

    for sym in symbols.iter_mut() {
        if sym.context == SymbolContext::Data {
            sym.addr += ic;
        }
    }

    if let Some(info) = overflow_at {
        errors.push(AssemblyError::MemoryOverflown(info));
    }

    FirstPassOutput { symbols, data_image, errors }
}

fn try_insert_label(
    symbols: &mut SymbolTable,
    name: String,
    addr: Address,
    context: SymbolContext,
    line_number: usize,
    raw_line: &str,
    errors: &mut Vec<AssemblyError>,
) {
    if let Some(existing) = symbols.get(&name) {
        errors.push(AssemblyError::SymbolAlreadyDefined {
            name,
            previous_line: existing.defining_line,
            info: LineInfo::new(line_number, raw_line),
        });
    } else {
        symbols.insert(Symbol { name, addr, context, defining_line: line_number });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_code_and_data_symbols() {
        let source = "MAIN: mov #3, r1\nstop\nLST: .data 1, 2, 3\n";
        let out = run(source);
        assert!(out.errors.is_empty());
        let main = out.symbols.get("MAIN").unwrap();
        assert_eq!(main.addr, 100);
        assert_eq!(main.context, SymbolContext::Code);
        let lst = out.symbols.get("LST").unwrap();
        // final ic = 100 + 2(mov) + 1(stop) = 103; data addr = 0 + 103
        assert_eq!(lst.addr, 103);
        assert_eq!(lst.context, SymbolContext::Data);
        assert_eq!(out.data_image, vec![1, 2, 3]);
    }

    #[test]
    fn string_directive_appends_nul() {
        let source = "STR: .string \"ab\"\n";
        let out = run(source);
        assert_eq!(out.data_image, vec!['a' as u32, 'b' as u32, 0]);
    }

    #[test]
    fn duplicate_label_is_an_error() {
        let source = "DUP: inc r1\nDUP: dec r2\n";
        let out = run(source);
        assert_eq!(out.errors.len(), 1);
        assert!(matches!(out.errors[0], AssemblyError::SymbolAlreadyDefined { ref name, previous_line: 1, .. } if name == "DUP"));
    }

    #[test]
    fn extern_symbol_has_zero_address() {
        let source = ".extern EXT\n";
        let out = run(source);
        let sym = out.symbols.get("EXT").unwrap();
        assert_eq!(sym.addr, 0);
        assert_eq!(sym.context, SymbolContext::External);
    }

    #[test]
    fn memory_overflow_is_reported_after_earlier_errors_in_source_order() {
        // A `.data` list long enough to push `ic + dc` past `MAX_ADDRESS`
        // sits on line 1; a duplicate label sits on line 3. Overflow is
        // *detected* while scanning line 1, first, but must only be
        // appended to the error list once the whole file has been read,
        // so it ends up after the line-3 error, not before it.
        let overflow_entries = (MAX_ADDRESS - INSTRUCTION_START + 2) as usize;
        let values = std::iter::repeat("0").take(overflow_entries).collect::<Vec<_>>().join(",");
        let source = format!(".data {}\nDUP: inc r1\nDUP: dec r2\n", values);

        let out = run(&source);
        assert_eq!(out.errors.len(), 2);
        assert!(matches!(out.errors[0], AssemblyError::SymbolAlreadyDefined { .. }));
        assert!(matches!(out.errors[1], AssemblyError::MemoryOverflown(_)));
    }
}
