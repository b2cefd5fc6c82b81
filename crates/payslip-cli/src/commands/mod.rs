//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod process;

use std::path::Path;

use payslip_core::PayslipConfig;

/// Load the pipeline configuration, falling back to defaults when no file is
/// given.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<PayslipConfig> {
    match config_path {
        Some(path) => Ok(PayslipConfig::from_file(Path::new(path))?),
        None => Ok(PayslipConfig::default()),
    }
}
