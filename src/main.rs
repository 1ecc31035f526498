//! sudoku-pipeline CLI binary.
//!
//! This is the minimal entrypoint; all logic lives in the library crate.

fn main() {
    if let Err(code) = sudoku_pipeline::cli::run() {
        std::process::exit(code.as_i32());
    }
}
