use clap::Parser;
use lf_cli::cli::commands;
use lf_cli::cli::{Cli, Commands};
use lf_cli::logging::init_logging;
use lf_cli::{LfError, config};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.quiet) {
        eprintln!("Failed to initialize logging: {e}");
        // Continue without structured logging rather than dying here.
    }

    config::load_env();

    let result = match &cli.command {
        Commands::Pull(args) => commands::pull::execute(args),
        Commands::Push(args) => commands::push::execute(args),
        Commands::Start(args) => commands::start::execute(args),
        Commands::Wait(args) => commands::wait::execute(args),
        Commands::Create(args) => commands::create::execute(args),
    };

    if let Err(e) = result {
        handle_error(&e);
    }
}

/// Print the error (and a hint when one exists) and exit with the
/// error's code.
fn handle_error(err: &LfError) -> ! {
    eprintln!("{err}");
    if let Some(suggestion) = err.suggestion() {
        eprintln!("hint: {suggestion}");
    }
    std::process::exit(err.exit_code());
}
