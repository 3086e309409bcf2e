use clap::Parser;

use calltrack::cli::{self, context::CliContext, Cli};
use calltrack::config::AppConfig;
use calltrack::telemetry;

fn main() {
    let cli = Cli::parse();

    let result = AppConfig::load().and_then(|config| {
        telemetry::init(&config.log_level)?;
        cli::run(cli, &config)
    });

    if let Err(e) = result {
        CliContext::print_error(&e);
        std::process::exit(1);
    }
}
