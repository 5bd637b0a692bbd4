//! vim-text - Export a VIM file to text, CSV, JSON, G3D and OBJ files.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use vim_text::export::{export_with, ExportOptions};

/// Exit status for usage errors.
const EXIT_USAGE: u8 = 2;

/// Log filter for each verbosity flag.
const LOG_QUIET: &str = "error";
const LOG_INFO: &str = "info";
const LOG_DEBUG: &str = "debug";
const LOG_TRACE: &str = "trace";

/// Parsed command line.
struct Args {
    input: PathBuf,
    output: PathBuf,
    log_level: &'static str,
    options: ExportOptions,
}

/// What the command line asks for.
enum Command {
    Export(Args),
    Help,
    Version,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();

    let args = match parse_args(&args) {
        Ok(Command::Export(args)) => args,
        Ok(Command::Help) => {
            print_help();
            return ExitCode::SUCCESS;
        }
        Ok(Command::Version) => {
            println!("{}", version());
            return ExitCode::SUCCESS;
        }
        Err(msg) => {
            eprintln!("Error: {}", msg);
            eprintln!("Usage: vim-text [OPTIONS] <input.vim> <output-dir>");
            eprintln!("Run 'vim-text --help' for more information.");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    init_logging(args.log_level);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    let mut log_level = LOG_INFO;
    let mut options = ExportOptions::default();
    let mut positional: Vec<&str> = Vec::new();

    for arg in args {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-V" | "--version" => return Ok(Command::Version),
            "-v" | "--verbose" => log_level = LOG_DEBUG,
            "-vv" | "--trace" => log_level = LOG_TRACE,
            "-q" | "--quiet" => log_level = LOG_QUIET,
            "--no-mmap" => options.use_mmap = false,
            s if s.starts_with('-') && s.len() > 1 => {
                return Err(format!("unknown option '{}'", s));
            }
            s => positional.push(s),
        }
    }

    let &[input, output] = positional.as_slice() else {
        return Err(format!("expected 2 arguments, got {}", positional.len()));
    };

    let input = PathBuf::from(input);
    if !input.is_file() {
        return Err(format!("input file '{}' does not exist", input.display()));
    }
    let output = PathBuf::from(output);
    if !output.is_dir() {
        return Err(format!("output directory '{}' does not exist", output.display()));
    }

    Ok(Command::Export(Args { input, output, log_level, options }))
}

fn init_logging(level: &str) {
    let layer = fmt::layer().with_writer(std::io::stderr).with_target(false);
    tracing_subscriber::registry()
        .with(layer)
        .with(EnvFilter::new(level))
        .init();
}

fn run(args: &Args) -> anyhow::Result<()> {
    let report = export_with(&args.input, &args.output, &args.options)
        .with_context(|| format!("failed to export {}", args.input.display()))?;

    for failed in &report.failed_tables {
        eprintln!("Warning: entity table '{}' skipped: {}", failed.name, failed.error);
    }
    Ok(())
}

fn version() -> String {
    format!(
        "vim-text {} (built {})",
        env!("CARGO_PKG_VERSION"),
        env!("VIM_TEXT_BUILD_STAMP")
    )
}

fn print_help() {
    println!("vim-text - Export a VIM file to text, CSV, JSON, G3D and OBJ files");
    println!();
    println!("USAGE:");
    println!("    vim-text [OPTIONS] <input.vim> <output-dir>");
    println!();
    println!("ARGS:");
    println!("    <input.vim>      VIM file to read (must exist)");
    println!("    <output-dir>     Existing directory; its contents are replaced");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose    Show debug output");
    println!("    -vv, --trace     Show trace output (very verbose)");
    println!("    -q, --quiet      Only show errors");
    println!("    --no-mmap        Read the input with buffered I/O instead of mmap");
    println!("    -h, --help       Show this help");
    println!("    -V, --version    Show version and build date");
    println!();
    println!("OUTPUT:");
    println!("    Header.txt  Assets/  Strings.txt  Geometry.g3d  meshes/<n>.obj");
    println!("    Nodes.json  Entities/<table>.csv  Entities/<table>.json");
    println!();
    println!("EXIT STATUS:");
    println!("    0  success (skipped entity tables are reported as warnings)");
    println!("    1  export failed");
    println!("    2  invalid arguments");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_flags() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("model.vim");
        std::fs::write(&input, b"").unwrap();
        let input = input.to_string_lossy().into_owned();
        let out = dir.path().to_string_lossy().into_owned();

        match parse_args(&strings(&["-vv", "--no-mmap", &input, &out])).unwrap() {
            Command::Export(args) => {
                assert_eq!(args.log_level, LOG_TRACE);
                assert!(!args.options.use_mmap);
            }
            _ => panic!("expected export"),
        }
        assert!(matches!(parse_args(&strings(&["-h"])).unwrap(), Command::Help));
        assert!(matches!(parse_args(&strings(&["--version"])).unwrap(), Command::Version));
    }

    #[test]
    fn test_errors() {
        assert!(parse_args(&strings(&[])).is_err());
        assert!(parse_args(&strings(&["--bogus", "a", "b"])).is_err());
        assert!(parse_args(&strings(&["missing.vim", "."])).is_err());
    }

    #[test]
    fn test_version_stamp() {
        let v = version();
        assert!(v.starts_with(&format!("vim-text {} (built ", env!("CARGO_PKG_VERSION"))));
        assert!(v.ends_with(')'));
        assert!(!v.contains("()"));
    }
}
