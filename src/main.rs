use clap::Parser;
use dayplan::cli::commands::Cli;
use dayplan::cli::handlers;
use dayplan::logging;

fn main() {
    let cli = Cli::parse();

    let result = if cli.command.is_none() {
        // No subcommand → launch TUI
        let data_dir = handlers::resolve_data_dir(cli.data_dir.as_deref());
        logging::init_file(&data_dir);
        dayplan::tui::run(&data_dir)
    } else {
        logging::init_stderr();
        handlers::dispatch(cli)
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
