use clap::Parser;
use dutyweave::cli::Cli;

fn main() {
    if let Err(e) = dutyweave::logger::init() {
        eprintln!("Failed to initialize logger: {e}");
        // Continue anyway - the CLI can still run without file/terminal logging.
    }

    let cli = Cli::parse();
    let code = dutyweave::cli::run(cli);
    std::process::exit(code);
}
