mod args;
mod scan;

use clap::Parser;
use log::{debug, warn, LevelFilter};
use snafu::ErrorCompat;

use crate::args::Args;

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);
    debug!("args: {:?}", args);

    let res = scan::config_reader::resolve_settings(&args).and_then(|s| scan::run_scan(&s));

    if let Err(e) = res {
        warn!("Error occured {:?}", e);
        eprintln!("{}", e.user_message());
        if args.verbose {
            if let Some(bt) = ErrorCompat::backtrace(&e) {
                eprintln!("trace: {}", bt);
            }
        }
        std::process::exit(1);
    }
}
