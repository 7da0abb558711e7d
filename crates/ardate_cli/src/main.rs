//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `ardate_core` linkage.
//! - Print one input rendered through the friendly-name registry.
//!
//! Usage: `ardate_cli [input] [format]`. Without a format, every built-in
//! name is printed.

use ardate_core::format::BUILTIN_FORMATS;
use ardate_core::DateTime;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("ardate_core ping={}", ardate_core::ping());
    println!("ardate_core version={}", ardate_core::core_version());

    let mut args = std::env::args().skip(1);
    let input = args.next().unwrap_or_else(|| "now".to_string());
    let format = args.next();

    let value = match DateTime::new(&input, None) {
        Ok(value) => value,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let names: Vec<&str> = match format.as_deref() {
        Some(name) => vec![name],
        None => BUILTIN_FORMATS.iter().map(|(name, _)| *name).collect(),
    };
    let mut status = ExitCode::SUCCESS;
    for name in names {
        match value.format(Some(name)) {
            Ok(text) => println!("{name:>9} {text}"),
            Err(err) => {
                eprintln!("error: {err}");
                status = ExitCode::FAILURE;
            }
        }
    }
    println!("canonical {}", value.to_canonical_string());
    status
}
