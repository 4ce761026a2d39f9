// Consonant Cutter command-line entry point

use consonant_cutter::cli::{self, Command};

fn main() {
    let command = match cli::parse_args(std::env::args().skip(1)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            eprintln!();
            eprintln!("{}", cli::usage());
            std::process::exit(1);
        }
    };

    let args = match command {
        Command::Help => {
            println!("{}", cli::usage());
            return;
        }
        Command::Run(args) => args,
    };

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match cli::run(&args) {
        Ok(summary) => println!("{}", summary),
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    }
}
