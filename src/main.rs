mod args;
mod board;

use clap::Parser;

fn main() {
    let args = args::Args::parse();

    if args.verbose {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }

    if let Err(e) = board::run_panel(&args) {
        eprintln!("quotaboard: {}", e);
        std::process::exit(1);
    }
}
