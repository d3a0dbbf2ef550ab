//! Command-line handling for the `plunge` binary.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

use plunge_core::{ConfigError, SimParams};
use plunge_engine::DriverError;

/// Reference scenario compiled into the binary, used when no path is given.
pub const DEFAULT_CONFIG: &str = include_str!("../data/sphere_drop_granular.json");

/// Usage line printed on bad invocations.
pub fn usage(program: &str) -> String {
    format!(
        "usage: {program} [config.json]\n  with no argument, the bundled sphere-drop scenario is used"
    )
}

/// Where the parameter set comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigSource {
    /// [`DEFAULT_CONFIG`].
    Bundled,
    /// A JSON file on disk.
    File(PathBuf),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bundled => write!(f, "bundled sphere-drop scenario"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Failures surfaced by the binary.
#[derive(Debug)]
pub enum CliError {
    /// Wrong number of arguments.
    Usage {
        /// Arguments received, program name excluded.
        given: usize,
    },
    /// The parameter file could not be loaded.
    Config(ConfigError),
    /// The run failed after startup.
    Run(DriverError),
}

impl CliError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage { .. } | Self::Config(_) => 1,
            Self::Run(_) => 2,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usage { given } => write!(f, "expected at most one argument, got {given}"),
            Self::Config(e) => write!(f, "cannot load configuration: {e}"),
            Self::Run(e) => write!(f, "run failed: {e}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Usage { .. } => None,
            Self::Config(e) => Some(e),
            Self::Run(e) => Some(e),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<DriverError> for CliError {
    fn from(e: DriverError) -> Self {
        Self::Run(e)
    }
}

/// Pick the configuration source from the arguments after the program name.
pub fn config_source(args: &[String]) -> Result<ConfigSource, CliError> {
    match args {
        [] => Ok(ConfigSource::Bundled),
        [path] => Ok(ConfigSource::File(PathBuf::from(path))),
        _ => Err(CliError::Usage { given: args.len() }),
    }
}

/// Load and validate the parameter set from `source`.
pub fn load_params(source: &ConfigSource) -> Result<SimParams, CliError> {
    let params = match source {
        ConfigSource::Bundled => SimParams::from_json_str(DEFAULT_CONFIG)?,
        ConfigSource::File(path) => SimParams::load(path)?,
    };
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_argument_uses_bundled_config() {
        assert_eq!(config_source(&[]).unwrap(), ConfigSource::Bundled);
    }

    #[test]
    fn one_argument_is_a_file() {
        let args = vec!["run.json".to_string()];
        assert_eq!(
            config_source(&args).unwrap(),
            ConfigSource::File(PathBuf::from("run.json"))
        );
    }

    #[test]
    fn two_arguments_is_usage_error() {
        let args = vec!["a.json".to_string(), "b.json".to_string()];
        match config_source(&args) {
            Err(e @ CliError::Usage { given: 2 }) => assert_eq!(e.exit_code(), 1),
            other => panic!("expected Usage, got {other:?}"),
        }
    }

    #[test]
    fn bundled_config_is_the_reference_scenario() {
        let p = load_params(&ConfigSource::Bundled).unwrap();
        assert_eq!(p.geometry.container, [1.0, 1.0, 1.0]);
        assert_eq!(p.geometry.fluid[2], 0.5);
        assert_eq!(p.body.radius, 0.05);
        assert_eq!(p.body.initial_position[2], 0.2);
        assert_eq!(p.sph.spacing_multiplier, 1.2);
        assert_eq!(p.sph.kernel_length, 0.02);
    }

    #[test]
    fn missing_file_is_config_error() {
        let missing = ConfigSource::File(PathBuf::from("/nonexistent/plunge.json"));
        match load_params(&missing) {
            Err(CliError::Config(ConfigError::Io { .. })) => {}
            other => panic!("expected Config(Io), got {other:?}"),
        }
    }
}
