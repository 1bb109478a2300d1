//! Provides the main entry point to the program.
use human_panic::{metadata, setup_panic};
use log::error;
use powerplan::cli::run_cli;
use powerplan::log::is_logger_initialised;

fn main() {
    setup_panic!(metadata!().support("Open an issue on the powerplan issue tracker."));

    if let Err(err) = run_cli() {
        if is_logger_initialised() {
            error!("{err:?}");
        } else {
            eprintln!("Error: {err:?}");
        }

        std::process::exit(1);
    }
}
