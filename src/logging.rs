//! Pretty-printing diagnostics to the console.
//!
//! The core ([`crate::assembler::errors`]) only ever produces plain,
//! uncolored [`std::fmt::Display`] text; turning that into a colored,
//! file-prefixed message for a terminal is this module's job.

use colored::Colorize;

use crate::assembler::AssemblyError;

/// Pretty-print one accumulated assembly error, prefixed with the source
/// file name it came from.
pub fn error(file_name: &str, err: &AssemblyError) {
    let title = "error:".red().bold();
    let file = file_name.cyan();
    for (i, line) in err.to_string().lines().enumerate() {
        if i == 0 {
            eprintln!("{} {}: {}", title, file, line);
        } else {
            eprintln!("       {}", line);
        }
    }
}

/// Pretty-print a standalone warning, outside of the error taxonomy (used
/// by the driver for conditions that don't stop a clean run, such as an
/// empty `.ent`/`.ext` file not being written).
pub fn warning(message: &str) {
    let title = "warning:".yellow().bold();
    eprintln!("{} {}", title, message);
}
