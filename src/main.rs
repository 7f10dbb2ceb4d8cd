use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use rilox::diagnostics::Diagnostics;
use rilox::ast_printer::AstPrinter;
use rilox::parser::Parser;
use rilox::scanner::Scanner;
use rilox::session::Session;

// sysexits-style exit codes.
const EX_USAGE: u8 = 64;
const EX_DATAERR: u8 = 65;
const EX_SOFTWARE: u8 = 70;

#[derive(ClapParser, Debug)]
#[command(version, about = "Tree-walking interpreter for a small dynamic scripting language", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan a file and print each token
    Tokenize { filename: PathBuf },

    /// Parse a file as a single expression and print its AST
    Parse { filename: PathBuf },

    /// Run a file as a program
    Run { filename: PathBuf },

    /// Start an interactive read-eval-print loop
    Repl,
}

fn read_file(filename: &PathBuf) -> Result<String> {
    info!("Reading file: {:?}", filename);

    let file = File::open(filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut source = String::new();

    let bytes = reader
        .read_to_string(&mut source)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    Ok(source)
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("rilox::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));

            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .init();

    info!("Logger initialized, writing to app.log");

    Ok(())
}

fn main() -> Result<ExitCode> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        // Minimal logger so log macros have a target.
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.command {
        Command::Tokenize { filename } => {
            let source = match read_file(&filename) {
                Ok(source) => source,
                Err(e) => {
                    eprintln!("{:#}", e);
                    return Ok(ExitCode::from(EX_USAGE));
                }
            };

            let mut had_error = false;

            for item in Scanner::new(source.as_bytes()) {
                match item {
                    Ok(token) => {
                        debug!("Scanned token: {}", token);

                        println!("{}", token);
                    }

                    Err(e) => {
                        had_error = true;

                        println!("{}", e);
                    }
                }
            }

            if had_error {
                debug!("Tokenization reported errors, exiting with code 65");

                return Ok(ExitCode::from(EX_DATAERR));
            }
        }

        Command::Parse { filename } => {
            let source = match read_file(&filename) {
                Ok(source) => source,
                Err(e) => {
                    eprintln!("{:#}", e);
                    return Ok(ExitCode::from(EX_USAGE));
                }
            };

            let mut diagnostics = Diagnostics::new();
            let mut tokens = Vec::new();

            for item in Scanner::new(source.as_bytes()) {
                match item {
                    Ok(token) => tokens.push(token),
                    Err(e) => diagnostics.report(&e),
                }
            }

            match Parser::new(&tokens, &mut diagnostics).parse_expression() {
                Ok(expr) => {
                    println!("{}", AstPrinter::print(&expr));
                }

                Err(e) => {
                    diagnostics.report(&e);
                }
            }

            if diagnostics.had_error() {
                return Ok(ExitCode::from(EX_DATAERR));
            }
        }

        Command::Run { filename } => {
            let source = match read_file(&filename) {
                Ok(source) => source,
                Err(e) => {
                    eprintln!("{:#}", e);
                    return Ok(ExitCode::from(EX_USAGE));
                }
            };

            let mut session = Session::new();
            session.run(&source);

            if session.had_error() {
                return Ok(ExitCode::from(EX_DATAERR));
            }

            if session.had_runtime_error() {
                return Ok(ExitCode::from(EX_SOFTWARE));
            }
        }

        Command::Repl => {
            run_prompt()?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Interactive loop: one line per run, on a persistent session so
/// definitions carry over. A bad line never poisons the next — the
/// static-error flag is reset after every line.
fn run_prompt() -> Result<()> {
    let stdin = std::io::stdin();
    let mut session = Session::new();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        let bytes = stdin.lock().read_line(&mut line)?;

        if bytes == 0 {
            info!("End of input, leaving REPL");
            break;
        }

        session.run(line.trim_end());
        session.reset_static_error();
    }

    Ok(())
}
