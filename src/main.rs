use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use lalrgen::Error;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        println!("Usage: lalrgen <grammar-path> <output-prefix>");
        return ExitCode::from(1);
    }
    let start = Instant::now();
    match run(&args[1], &args[2]) {
        Ok(()) => {
            println!("Completed - Elapsed {}us", start.elapsed().as_micros());
            ExitCode::SUCCESS
        }
        Err(error) => {
            // The message is the contract; the front-end still exits 0.
            println!("{error}");
            ExitCode::SUCCESS
        }
    }
}

fn run(grammar_path: &str, output_prefix: &str) -> Result<(), Error> {
    let grammar_text = std::fs::read_to_string(grammar_path).map_err(|source| Error::Io {
        op: "read",
        path: PathBuf::from(grammar_path),
        source,
    })?;
    let code = lalrgen::generate(&grammar_text)?;
    code.write_to(output_prefix)
}
