//! CLI tool to inspect how shell scripts are tokenized.

use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use simplelog::{ColorChoice, Config, LevelFilter, TerminalMode, TermLogger};

fn usage() -> ExitCode {
    eprintln!("Usage: shellex <command> [-v|-vv] [files...]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  tokens  Print one token per line");
    eprintln!("  spans   Print tokens with line and column");
    eprintln!("  json    Print tokens as a JSON array");
    eprintln!("  check   Report input no rule recognizes");
    eprintln!("  detect  Print the shebang score of each file");
    eprintln!();
    eprintln!("Use - to read standard input.");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  shellex tokens install.sh");
    eprintln!("  shellex check -v ~/.bashrc");
    eprintln!("  cat script.sh | shellex json -");
    ExitCode::from(2)
}

fn read_source(path: &str) -> io::Result<String> {
    if path == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        fs::read_to_string(path)
    }
}

fn init_logging(verbosity: usize) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .ok();
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        return usage();
    }

    let command = args[1].as_str();
    let mut verbosity = 0;
    let mut files = Vec::new();
    for arg in &args[2..] {
        match arg.as_str() {
            "-v" | "--verbose" => verbosity += 1,
            "-vv" => verbosity += 2,
            _ => files.push(arg.as_str()),
        }
    }
    init_logging(verbosity);

    if files.is_empty() {
        eprintln!("Error: no files specified");
        return ExitCode::from(2);
    }

    let mut had_error = false;

    for path in files {
        let content = match read_source(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{path}: {e}");
                had_error = true;
                continue;
            }
        };

        match command {
            "tokens" => {
                print!("{}", shellex::dump::format(&shellex::tokenize(&content)));
            }
            "spans" => {
                print!(
                    "{}",
                    shellex::dump::format_with_spans(&shellex::tokenize(&content))
                );
            }
            "json" => match shellex::dump::to_json(&shellex::tokenize(&content)) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("{path}: {e}");
                    had_error = true;
                }
            },
            "check" => {
                let mut lexer = shellex::lex(&content);
                let tokens: Vec<_> = lexer.by_ref().collect();
                let mut errors = 0;
                for token in shellex::dump::errors(&tokens) {
                    eprintln!(
                        "{path}:{}:{}: unrecognized {:?}",
                        token.span.line, token.span.column, token.text
                    );
                    errors += 1;
                }
                let unclosed = lexer.stack();
                if unclosed.len() > 1 {
                    eprintln!("{path}: input ends inside {}", unclosed[1..].join(" > "));
                }
                if errors == 0 {
                    eprintln!("{path}: ok ({} token(s))", tokens.len());
                } else {
                    eprintln!("{path}: {errors} unrecognized character(s)");
                    had_error = true;
                }
            }
            "detect" => {
                let score = shellex::analyze_text(&content);
                let interpreter = shellex::shebang(&content).map_or("", str::trim);
                println!("{path}\t{score}\t{interpreter}");
            }
            _ => {
                eprintln!("Unknown command: {command}");
                return ExitCode::from(2);
            }
        }
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
