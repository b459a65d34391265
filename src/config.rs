use crate::mcp::contracts::{DEFAULT_DENSITY, DEFAULT_OUTPUT_DIR};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where the external collaborators live and how they are driven.
#[derive(Debug, Clone)]
pub struct Config {
    pub python: String,
    pub scripts_dir: PathBuf,
    pub renderer: String,
    pub rasterizer: String,
    pub density: u32,
    pub output_dir: PathBuf,
    pub timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            python: "python3".to_string(),
            scripts_dir: PathBuf::from("."),
            renderer: "libreoffice".to_string(),
            rasterizer: "convert".to_string(),
            density: DEFAULT_DENSITY,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            timeout: None,
        }
    }
}

impl Config {
    pub fn script_path(&self, script: &str) -> String {
        self.scripts_dir.join(script).to_string_lossy().into_owned()
    }

    /// Resolves a caller-supplied export directory against the configured default.
    pub fn export_dir(&self, requested: Option<&str>) -> PathBuf {
        match requested {
            Some(dir) => Path::new(dir).to_path_buf(),
            None => self.output_dir.clone(),
        }
    }
}
