use std::{env, fs};

use asm24::assembler::{self, AssembleOutcome, Address};
use asm24::logging;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <base1> [base2 ...]", args[0]);
        std::process::exit(1);
    }

    let mut had_failure = false;
    for base in &args[1..] {
        if !process(base) {
            had_failure = true;
        }
    }
    if had_failure {
        std::process::exit(2);
    }
}

fn process(base: &str) -> bool {
    let input_path = format!("{}.as", base);
    let source = match fs::read_to_string(&input_path) {
        Ok(s) => s,
        Err(e) => {
            logging::warning(&format!("{}: {}", input_path, e));
            return false;
        }
    };

    let outcome = assembler::assemble(&source);
    if !outcome.is_clean() {
        for err in &outcome.errors {
            logging::error(&input_path, err);
        }
        return false;
    }

    if let Err(e) = fs::write(format!("{}.ob", base), render_object(&outcome)) {
        logging::warning(&format!("failed to write {}.ob: {}", base, e));
        return false;
    }
    if !outcome.entry_list.is_empty() {
        if let Err(e) = fs::write(format!("{}.ent", base), render_symbol_list(&outcome.entry_list)) {
            logging::warning(&format!("failed to write {}.ent: {}", base, e));
            return false;
        }
    }
    if !outcome.external_refs.is_empty() {
        if let Err(e) = fs::write(format!("{}.ext", base), render_symbol_list(&outcome.external_refs)) {
            logging::warning(&format!("failed to write {}.ext: {}", base, e));
            return false;
        }
    }
    true
}

fn render_object(outcome: &AssembleOutcome) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>7} {}\n",
        outcome.instruction_image.len(),
        outcome.data_image.len()
    ));
    let mut addr = assembler::INSTRUCTION_START;
    for word in outcome.instruction_image.iter().chain(outcome.data_image.iter()) {
        out.push_str(&format!("{:07} {:06x}\n", addr, word));
        addr += 1;
    }
    out
}

fn render_symbol_list(list: &[(String, Address)]) -> String {
    let mut out = String::new();
    for (name, addr) in list {
        out.push_str(&format!("{} {:07}\n", name, addr));
    }
    out
}
