//! Textual macro pre-expansion: `mcro NAME` .. `mcroend` blocks, substituted
//! verbatim wherever `NAME` appears on its own line. No parameters, no
//! nesting, no conditional assembly.

use std::collections::HashMap;

use crate::assembler::errors::{AssemblyError, LineInfo, MacroError};
use crate::assembler::keywords;
use crate::assembler::MAX_LINE_LENGTH;

enum State {
    Normal,
    /// `Some(name)` records lines into that macro's body; `None` still
    /// consumes lines up to the matching `mcroend` but discards them (an
    /// invalid or duplicate `mcro` name still "opens" a body per the
    /// source, it's just one nothing gets stored into).
    InBody(Option<String>),
}

pub fn expand(source: &str) -> (String, Vec<AssemblyError>) {
    let mut errors = Vec::new();
    let mut macros: HashMap<String, Vec<String>> = HashMap::new();
    let mut output = String::new();
    let mut state = State::Normal;

    for (idx, raw_line) in source.lines().enumerate() {
        let line_number = idx + 1;
        let length = raw_line.chars().count();
        if length > MAX_LINE_LENGTH {
            errors.push(AssemblyError::Macro(
                MacroError::LineTooLong { length },
                LineInfo::new(line_number, raw_line),
            ));
            continue;
        }

        let trimmed = raw_line.trim();
        match &mut state {
            State::Normal => {
                if let Some(candidate) = trimmed.strip_prefix("mcro").filter(|c| {
                    c.is_empty() || c.starts_with(|ch: char| ch.is_whitespace())
                }) {
                    let name = candidate.trim();
                    match validate_macro_name(name) {
                        Ok(()) => {
                            if macros.contains_key(name) {
                                errors.push(AssemblyError::Macro(
                                    MacroError::AlreadyDefined { name: name.to_string() },
                                    LineInfo::new(line_number, raw_line),
                                ));
                                // keep the first definition's body; this
                                // redefinition's body is recorded nowhere.
                                state = State::InBody(None);
                            } else {
                                macros.insert(name.to_string(), Vec::new());
                                state = State::InBody(Some(name.to_string()));
                            }
                        }
                        Err(reason) => {
                            errors.push(AssemblyError::Macro(reason, LineInfo::new(line_number, raw_line)));
                            state = State::InBody(None);
                        }
                    }
                } else if let Some(body) = macros.get(trimmed) {
                    for body_line in body {
                        output.push_str(body_line);
                        output.push('\n');
                    }
                } else {
                    output.push_str(raw_line);
                    output.push('\n');
                }
            }
            State::InBody(name) => {
                if trimmed == "mcroend" {
                    state = State::Normal;
                } else if let Some(name) = name {
                    macros.get_mut(name).unwrap().push(raw_line.to_string());
                }
            }
        }
    }

    for (idx, raw_line) in source.lines().enumerate() {
        let line_number = idx + 1;
        let trimmed_start = raw_line.trim_start();
        if let Some(colon) = trimmed_start.find(':') {
            let candidate = trimmed_start[..colon].trim();
            if macros.contains_key(candidate) {
                errors.push(AssemblyError::Macro(
                    MacroError::DefinedAsLabel { name: candidate.to_string() },
                    LineInfo::new(line_number, raw_line),
                ));
            }
        }
    }

    (output, errors)
}

fn validate_macro_name(name: &str) -> Result<(), MacroError> {
    if name.is_empty() {
        return Err(MacroError::InvalidName { reason: "expected a macro name after \"mcro\"".into() });
    }
    let first = name.chars().next().unwrap();
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(MacroError::InvalidName {
            reason: format!("macro name \"{}\" must start with a letter or underscore", name),
        });
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(MacroError::InvalidName {
            reason: format!("macro name \"{}\" contains an invalid character", name),
        });
    }
    if name.chars().count() > crate::assembler::MAX_LABEL_LEN {
        return Err(MacroError::InvalidName {
            reason: format!("macro name \"{}\" exceeds {} characters", name, crate::assembler::MAX_LABEL_LEN),
        });
    }
    if keywords::lookup_instruction(name).is_some()
        || keywords::lookup_directive(name).is_some()
        || keywords::register_index(name).is_some()
    {
        return Err(MacroError::InvalidName {
            reason: format!("macro name \"{}\" collides with a reserved word", name),
        });
    }
    Ok(())
}
