// src/main.rs

use headless_host::{cli, logging, run};

fn main() {
    if let Err(err) = run_main() {
        eprintln!("headless-host error: {err}");
        std::process::exit(1);
    }
}

fn run_main() -> headless_host::errors::Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args)
}
