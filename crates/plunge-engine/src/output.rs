//! Output directory preparation.

use std::fs::{self, File};
use std::io::BufWriter;

use log::info;
use plunge_core::SimParams;
use plunge_output::{DirectoryStore, OutputError, PenetrationLog};

use crate::error::DriverError;

/// File name of the effective-parameter copy.
pub const PARAMS_FILE: &str = "params.json";

/// Create the output directory, write the effective parameters into it
/// and open (truncating) the penetration log.
pub fn directory_output(
    params: &SimParams,
) -> Result<(DirectoryStore, PenetrationLog<BufWriter<File>>), DriverError> {
    let store = DirectoryStore::create(&params.output.directory)?;
    let json = params.to_json_pretty()?;
    fs::write(store.dir().join(PARAMS_FILE), json).map_err(OutputError::from)?;
    let log_path = store.dir().join(&params.output.penetration_log);
    let log = PenetrationLog::create(&log_path)?;
    info!(
        "output directory {} (snapshots {}), penetration log {}",
        store.dir().display(),
        if params.output.enabled { "on" } else { "off" },
        log_path.display()
    );
    Ok((store, log))
}

#[cfg(test)]
mod tests {
    use super::*;
    use plunge_test_utils::coarse_params;

    #[test]
    fn writes_params_and_truncates_log() {
        let dir = std::env::temp_dir().join(format!("plunge-engine-out-{}", std::process::id()));
        let mut p = coarse_params();
        p.output.directory = dir.clone();
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(&p.output.penetration_log), "stale\n").unwrap();

        let (store, _log) = directory_output(&p).unwrap();
        assert_eq!(store.dir(), dir.as_path());
        let copied = SimParams::from_json_str(&fs::read_to_string(dir.join(PARAMS_FILE)).unwrap())
            .unwrap();
        assert_eq!(copied.output.directory, p.output.directory);
        assert!((copied.sph.kernel_length - p.sph.kernel_length).abs() < 1e-15);
        assert_eq!(copied.sph.boundary_layers, p.sph.boundary_layers);
        let log = fs::read_to_string(dir.join(&p.output.penetration_log)).unwrap();
        assert!(log.is_empty());
        fs::remove_dir_all(&dir).ok();
    }
}
