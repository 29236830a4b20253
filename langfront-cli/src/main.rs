use clap::Parser;
use langfront::ast::DefaultAstBuilder;
use langfront::grammar;
use langfront::lr;
use langfront::reader::BufReader;
use langfront::scanner::Scanner;
use langfront::spec;
use langfront::symbol::HashSymbolTable;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

/// Scans and parses a source file against a token-spec file and a grammar
/// file, reporting success or a syntax error.
#[derive(Debug, Parser)]
#[command(name = "langfront", version, about)]
struct Cli {
    /// Path to the token-spec file (spec §6: `NAME REGEX IGNORE PRIORITY` per line).
    tokens: PathBuf,
    /// Path to the grammar file (`Terminals:`/`NonTerminals:`/`Start:`/`Productions:` sections).
    grammar: PathBuf,
    /// Path to the source file to parse.
    input: PathBuf,
    /// Name of the token-spec rule whose matches are interned as identifiers.
    #[arg(long, default_value = "IDENT")]
    ignore_kind: String,
    /// Dump the full token stream to stdout instead of parsing.
    #[arg(long)]
    dump_tokens: bool,
    /// Raise scanner and table-builder diagnostics to trace level, logging
    /// every shift/reduce/goto step of the parse.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Error)]
enum AppError {
    #[error("reading {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Core(#[from] langfront::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.trace);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Wires `log` to `env_logger`, honoring `RUST_LOG` as usual but raising the
/// floor to `trace` when `--trace` is given, so per-step scanner/parser
/// diagnostics are emitted without the caller having to know the env var.
fn init_logging(trace: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if trace {
        builder.filter_level(log::LevelFilter::Trace);
    }
    builder.init();
}

fn run(cli: &Cli) -> Result<(), AppError> {
    let spec_src = read(&cli.tokens)?;
    let grammar_src = read(&cli.grammar)?;
    let input_src = read(&cli.input)?;

    log::info!("loading token spec from {}", cli.tokens.display());
    let specs = spec::parse(&spec_src).map_err(langfront::Error::from)?;

    log::info!("loading grammar from {}", cli.grammar.display());
    let grammar = grammar::parse(&grammar_src).map_err(langfront::Error::from)?;

    log::info!("building LR(1) tables");
    let tables = lr::build(&grammar).map_err(langfront::Error::from)?;

    log::info!("compiling scanner from {} rules", specs.len());
    if cli.dump_tokens {
        dump_tokens(&specs, &cli.ignore_kind, input_src)?;
        return Ok(());
    }

    let mut scanner = Scanner::new(BufReader::new(input_src), &specs, Some(&cli.ignore_kind))
        .map_err(langfront::Error::from)?;
    let mut symbols = HashSymbolTable::new();
    let mut builder = DefaultAstBuilder;
    let ast = langfront::parser::parse(&tables, &mut scanner, &mut symbols, &mut builder)
        .map_err(langfront::Error::from)?;

    println!("parse succeeded: {} leaves", ast.leaves().len());
    Ok(())
}

fn dump_tokens(specs: &[spec::TokenSpec], ignore_kind: &str, source: String) -> Result<(), AppError> {
    let mut scanner =
        Scanner::new(BufReader::new(source), specs, Some(ignore_kind)).map_err(langfront::Error::from)?;
    let mut symbols = HashSymbolTable::new();
    loop {
        let token = scanner.next_token(&mut symbols);
        let is_eof = token.kind == langfront::token::TokenKind::EndOfFile;
        println!("{token}");
        if is_eof {
            break;
        }
    }
    Ok(())
}

fn read(path: &PathBuf) -> Result<String, AppError> {
    fs::read_to_string(path).map_err(|source| AppError::Read {
        path: path.clone(),
        source,
    })
}
