use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use saspector::cli::Cli;
use saspector::pipeline;
use saspector::tools::ProcessRunner;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("saspector=debug,info")
    } else {
        EnvFilter::new("saspector=info")
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let progress = !cli.verbose;
        let config = cli.into_config();
        let runner = ProcessRunner::new(progress);

        match pipeline::execute(&config, &runner) {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                error!("{e:#}");
                ExitCode::FAILURE
            }
        }
    })
}
