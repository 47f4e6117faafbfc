use std::process::ExitCode;

use clap::Parser;
use irplay::Cli;

fn main() -> ExitCode {
    let args = Cli::parse();

    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .parse_default_env()
        .format_timestamp_millis()
        .init();

    log::debug!("irplay {}", irplay::VERSION);

    match irplay::run(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            let code = e.exit_code();
            eprintln!("{:?}", miette::Report::new(e));
            ExitCode::from(code)
        }
    }
}
