//! plotpipe CLI - Turn numeric tables into gnuplot plots

mod cli;

use clap::Parser;
use plotpipe::SessionConfig;

fn main() {
    // Logging is initialized by app.run() once the CLI flags are known
    let cli_args = cli::Cli::parse();

    let config = match SessionConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    let mut app = cli::PlotpipeApp::with_config(config);

    if let Err(e) = app.run(cli_args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
