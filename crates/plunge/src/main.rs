//! `plunge [config.json]`: run the sphere-drop simulation.

use std::process::ExitCode;

use log::{error, info};
use plunge::cli::{config_source, load_params, usage, CliError};

fn run(args: &[String]) -> Result<(), CliError> {
    let source = config_source(args)?;
    info!("loading configuration from {source}");
    let params = load_params(&source)?;
    let summary = plunge::run_sphere_drop(params)?;
    info!("{summary}");
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let argv: Vec<String> = std::env::args().collect();
    let program = argv.first().map_or("plunge", String::as_str);
    match run(argv.get(1..).unwrap_or(&[])) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            if matches!(e, CliError::Usage { .. } | CliError::Config(_)) {
                eprintln!("{}", usage(program));
            }
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
