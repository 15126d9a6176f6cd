mod cli;

use clap::Parser;

use cli::{handle_config_action, run_convert, Args, Command};

fn init_logging(args: &Args) {
    // RUST_LOG wins over -v when set.
    env_logger::Builder::new()
        .filter_level(args.log_level())
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(&args);

    let result = match &args.command {
        Some(Command::Config { action }) => handle_config_action(&args, action),
        None => run_convert(&args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
