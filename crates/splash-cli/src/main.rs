use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use splash_config::RunSettings;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod config;
mod logging;

use logging::Verbosity;

/// Splash stack-machine runner.
///
/// Splash programs are comma- or newline-separated literals and instructions
/// executed on a single operand stack.
///
/// EXAMPLES:
///     splash run main.splash                 Run a program
///     splash run main.splash --input 42      Run with an input value
///     splash compile main.splash             Write main.scb
///     splash disasm main.scb                 Show a program listing
///
/// ENVIRONMENT VARIABLES:
///     SPLASH_TRACE          Set to '1' to trace execution
///     SPLASH_STRICT_LABELS  Set to '1' to reject GOTO to undefined labels
///     SPLASH_INPUT          Default input literal
///     NO_COLOR              Set to disable colored output
///     RUST_LOG              Override the log filter
#[derive(Parser)]
#[command(name = "splash")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a Splash source or compiled (.scb) file
    ///
    /// Prints program output, then the final top-of-stack value and the
    /// execution time.
    ///
    /// EXAMPLES:
    ///     splash run main.splash                Run a program
    ///     splash run main.splash -i '"name"'    Push a string on INPUT
    ///     splash run main.scb --trace           Log every instruction
    #[command(visible_alias = "r")]
    Run {
        /// Path to the program file
        file: PathBuf,
        /// Literal pushed by INPUT (default: -1)
        #[arg(long, short = 'i', allow_hyphen_values = true)]
        input: Option<String>,
        /// Log the stack and each instruction before it runs
        #[arg(long, short = 't')]
        trace: bool,
        /// Log tokens and labels as they are registered
        #[arg(long, short = 'd')]
        debug: bool,
        /// Fail on GOTO to an undefined label
        #[arg(long)]
        strict_labels: bool,
        /// Do not print the final value
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Resolve a source file and write it in the .scb format
    ///
    /// EXAMPLES:
    ///     splash compile main.splash             Write main.scb
    ///     splash compile main.splash -o app.scb  Choose the output path
    #[command(visible_alias = "c")]
    Compile {
        /// Path to the source file
        file: PathBuf,
        /// Output path
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// Log tokens and labels as they are registered
        #[arg(long, short = 'd')]
        debug: bool,
    },

    /// Print a listing of labels and instructions
    Disasm {
        /// Path to the program file
        file: PathBuf,
    },

    /// Print the resolved program as JSON
    Tokens {
        /// Path to the program file
        file: PathBuf,
    },

    /// Generate shell completions
    ///
    /// EXAMPLES:
    ///     splash completions bash > ~/.bash_completions/splash.bash
    ///     splash completions zsh > ~/.zfunc/_splash
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Commands {
    /// Log verbosity from flags, with configured tracing raising it for `run`
    fn verbosity(&self, settings: &RunSettings) -> Verbosity {
        match self {
            Commands::Run { debug, trace, .. } => {
                Verbosity::from_flags(*debug, *trace || settings.trace)
            }
            Commands::Compile { debug, .. } => Verbosity::from_flags(*debug, false),
            _ => Verbosity::Quiet,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let cli_config = config::Config::from_env();

    if cli_config.no_color {
        colored::control::set_override(false);
    }

    match try_main(cli, &cli_config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn try_main(cli: Cli, cli_config: &config::Config) -> Result<()> {
    // Project configuration (splash.toml) and global defaults
    let project = commands::load_config()?;
    let settings = project.resolved_run();

    logging::init(cli.command.verbosity(&settings), !cli_config.no_color);

    match cli.command {
        Commands::Run {
            file,
            input,
            trace,
            debug: _,
            strict_labels,
            quiet,
        } => {
            let args = commands::run::RunArgs {
                file,
                input,
                trace,
                strict_labels,
                quiet,
            };
            commands::run::run(&args, &settings)?;
        }
        Commands::Compile { file, output, .. } => {
            let out_dir = project.out_dir();
            commands::compile::run(&file, output.as_deref(), out_dir.as_deref())?;
        }
        Commands::Disasm { file } => commands::disasm::run(&file)?,
        Commands::Tokens { file } => commands::tokens::run(&file)?,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
        }
    }

    Ok(())
}
