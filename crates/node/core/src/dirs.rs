//! Directory management for the dvpn node.

use crate::args::DataDirArgs;
use directories::ProjectDirs;
use eyre::{Result, WrapErr};
use std::{fs, path::PathBuf};

/// Name of the node configuration file inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Returns the default project directories for dvpn.
pub fn default_project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "dvpn", "dvpn")
}

/// Returns the default data directory path.
pub fn default_data_dir() -> Option<PathBuf> {
    default_project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

/// Data directory layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDirs {
    /// Root data directory
    pub root: PathBuf,
    /// Home directory of the V2Ray engine
    pub v2ray: PathBuf,
    config: Option<PathBuf>,
}

impl DataDirs {
    /// Resolve the layout from command line args without touching the disk.
    pub fn resolve(args: &DataDirArgs) -> Self {
        let root = args
            .datadir
            .clone()
            .unwrap_or_else(|| default_data_dir().unwrap_or_else(|| PathBuf::from(".dvpn")));
        let v2ray = root.join("v2ray");

        Self {
            root,
            v2ray,
            config: args.config.clone(),
        }
    }

    /// Resolve the layout and create the root directory.
    pub fn new(args: &DataDirArgs) -> Result<Self> {
        let dirs = Self::resolve(args);
        fs::create_dir_all(&dirs.root)
            .wrap_err_with(|| format!("failed to create directory {}", dirs.root.display()))?;
        Ok(dirs)
    }

    /// Returns the path to the node config file.
    pub fn config_file(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| self.root.join(CONFIG_FILE_NAME))
    }
}
