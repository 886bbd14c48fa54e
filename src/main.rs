use clap::{Parser as ClapParser, Subcommand};
use log::info;
use loxfront::config::{Config, OutputFormat};
use loxfront::error::{CompilerError, Diagnostics};
use loxfront::printer::{AstPrinter, SourcePrinter};
use loxfront::token::Token;
use loxfront::{parse, scan};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Exit code for malformed input, matching the usual `EX_DATAERR`.
const EXIT_DATA_ERROR: u8 = 65;

#[derive(ClapParser)]
#[command(author, version, about = "Lox lexer and parser front end")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the token stream of a Lox file
    Tokens {
        /// Path to the source file
        file: PathBuf,
    },
    /// Parse a Lox file and print its syntax tree
    Parse {
        /// Path to the source file
        file: PathBuf,
        /// Output format, overriding the configured one
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Report every lexical and syntax error in a Lox file
    Check {
        /// Path to the source file
        file: PathBuf,
    },
    /// Manage loxfront configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Write the default configuration file
    Init,
}

/// Token list and tree of one file, plus every error either phase reported.
struct FrontEnd {
    tokens: Vec<Token>,
    statements: Vec<loxfront::ast::Stmt>,
    diagnostics: Diagnostics,
}

fn read_source(path: &Path) -> Result<String, CompilerError> {
    info!("reading {}", path.display());
    Ok(fs::read_to_string(path)?)
}

fn run_front_end(source: &str) -> FrontEnd {
    let mut diagnostics = Diagnostics::new();

    let tokens = scan(source, |err| diagnostics.report(err));
    let statements = parse(tokens.clone(), |err| diagnostics.report(err));

    FrontEnd {
        tokens,
        statements,
        diagnostics,
    }
}

fn report(diagnostics: &Diagnostics) {
    for err in diagnostics.iter() {
        eprintln!("{}", err);
    }
}

fn exit_status(diagnostics: &Diagnostics) -> ExitCode {
    if diagnostics.had_error() {
        ExitCode::from(EXIT_DATA_ERROR)
    } else {
        ExitCode::SUCCESS
    }
}

fn print_tokens(tokens: &[Token]) {
    for token in tokens {
        println!("{:>4} {}", token.line, token);
    }
}

fn print_tree(front_end: &FrontEnd, format: OutputFormat) -> Result<(), CompilerError> {
    match format {
        OutputFormat::Sexpr => println!("{}", AstPrinter::new().print_program(&front_end.statements)),
        OutputFormat::Source => {
            println!("{}", SourcePrinter::new().print_program(&front_end.statements))
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&front_end.statements)?),
    }
    Ok(())
}

fn init_logging(config: &Config) {
    let env = env_logger::Env::default().default_filter_or(config.log_filter.as_str());
    env_logger::Builder::from_env(env).format_timestamp(None).init();
}

fn run(cli: Cli, config: Config) -> Result<ExitCode, CompilerError> {
    match cli.command {
        Commands::Tokens { file } => {
            let source = read_source(&file)?;
            let front_end = run_front_end(&source);
            print_tokens(&front_end.tokens);
            report(&front_end.diagnostics);
            Ok(exit_status(&front_end.diagnostics))
        }
        Commands::Parse { file, format } => {
            let source = read_source(&file)?;
            let front_end = run_front_end(&source);
            report(&front_end.diagnostics);

            // A tree with synchronized gaps is never handed on.
            if front_end.diagnostics.had_error() {
                return Ok(exit_status(&front_end.diagnostics));
            }

            if config.show_tokens {
                print_tokens(&front_end.tokens);
            }
            print_tree(&front_end, format.unwrap_or(config.output))?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { file } => {
            let source = read_source(&file)?;
            let front_end = run_front_end(&source);
            report(&front_end.diagnostics);

            if !front_end.diagnostics.had_error() {
                println!(
                    "{}: ok ({} top-level statements)",
                    file.display(),
                    front_end.statements.len()
                );
            }
            Ok(exit_status(&front_end.diagnostics))
        }
        Commands::Config { command } => {
            match command {
                ConfigCommands::Show => {
                    println!("# {}", Config::get_config_path().display());
                    println!("{}", serde_json::to_string_pretty(&config)?);
                }
                ConfigCommands::Init => {
                    let config_path = Config::get_config_path();
                    if config_path.exists() {
                        println!("Config file already exists at: {}", config_path.display());
                    } else {
                        let written = Config::default().save()?;
                        println!("Initialized new config file at: {}", written.display());
                    }
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = Config::load();
    init_logging(&config);

    match run(cli, config) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
