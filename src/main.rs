// src/main.rs

use std::process::ExitCode;

use sitepipe::{cli, logging};

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();

    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("sitepipe: {err:?}");
        return ExitCode::FAILURE;
    }

    match sitepipe::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("sitepipe: {err:?}");
            ExitCode::FAILURE
        }
    }
}
