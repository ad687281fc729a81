//! Skyload CLI
//!
//! Parse a build file, or list the files it depends on, and print JSON.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sky_diagnostic::{BufferSink, DiagnosticSink};
use skyload::{init_tracing, BuildFileParser, LoaderConfig};

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = args[1].as_str();
    match command {
        "parse" | "includes" => {
            let mut config_path = None;
            let mut file_path = None;
            let mut i = 2;
            while i < args.len() {
                if args[i] == "--config" && i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 2;
                } else if let Some(value) = args[i].strip_prefix("--config=") {
                    config_path = Some(PathBuf::from(value));
                    i += 1;
                } else if !args[i].starts_with('-') && file_path.is_none() {
                    file_path = Some(PathBuf::from(&args[i]));
                    i += 1;
                } else {
                    eprintln!("error: unexpected argument '{}'", args[i]);
                    std::process::exit(1);
                }
            }

            let Some(file_path) = file_path else {
                eprintln!("error: missing build file path");
                eprintln!("Usage: skyload {command} <BUCK> [--config <config.json>]");
                std::process::exit(1);
            };

            let (parser, sink) = match make_parser(config_path.as_deref()) {
                Ok(made) => made,
                Err(message) => {
                    eprintln!("error: {message}");
                    std::process::exit(1);
                }
            };
            run(command, &parser, &sink, &absolute(&file_path));
        }
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {command}");
            print_usage();
            std::process::exit(1);
        }
    }
}

fn make_parser(config_path: Option<&Path>) -> Result<(BuildFileParser, Arc<BufferSink>), String> {
    let config = match config_path {
        Some(path) => LoaderConfig::from_file(path).map_err(|e| e.to_string())?,
        None => LoaderConfig::default(),
    };
    let cwd =
        std::env::current_dir().map_err(|e| format!("cannot read current directory: {e}"))?;
    let options = config.into_options(&cwd).map_err(|e| e.to_string())?;
    let sink = Arc::new(BufferSink::new());
    let parser =
        BuildFileParser::new(options).with_sink(Arc::clone(&sink) as Arc<dyn DiagnosticSink>);
    Ok((parser, sink))
}

fn run(command: &str, parser: &BuildFileParser, sink: &BufferSink, path: &Path) {
    let output = if command == "parse" {
        parser
            .parse(path)
            .map(|result| serde_json::to_string_pretty(&result))
    } else {
        parser
            .list_included_files(path)
            .map(|files| serde_json::to_string_pretty(&files))
    };

    for diagnostic in sink.take() {
        eprintln!("{diagnostic}");
    }

    match output {
        Ok(Ok(json)) => println!("{json}"),
        Ok(Err(e)) => {
            eprintln!("error: cannot serialize result: {e}");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

fn print_usage() {
    println!("Skyload - build file loader");
    println!();
    println!("Usage: skyload <command> [options]");
    println!();
    println!("Commands:");
    println!("  parse <BUCK>       Evaluate a build file and print its targets as JSON");
    println!("  includes <BUCK>    Print every file the build file depends on");
    println!("  help               Show this help message");
    println!();
    println!("Options:");
    println!("  --config <file>    JSON loader configuration (project root, cells,");
    println!("                     implicit includes, config values, native rules)");
    println!();
    println!("Set RUST_LOG (for example RUST_LOG=skyload=debug) to enable logging.");
}
