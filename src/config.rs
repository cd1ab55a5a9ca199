use std::env;
use std::path::{Path, PathBuf};

use crate::session::LoadKind;

/// Environment fallback for the package opened when none is given
pub const SAMPLE_ENV: &str = "DEXVIEWER_SAMPLE_APK";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerConfig {
    /// Package loaded as the startup sample
    pub sample_package: Option<PathBuf>,
    /// Restrict sample loads to the classes of the manifest's own package
    pub app_classes_only: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            sample_package: None,
            app_classes_only: true,
        }
    }
}

impl ViewerConfig {
    pub fn from_env() -> Self {
        Self {
            sample_package: env::var_os(SAMPLE_ENV).map(PathBuf::from),
            ..Default::default()
        }
    }

    /// An explicit package is a user selection; otherwise fall back to the sample
    pub fn resolve_package(&self, explicit: Option<&Path>) -> Option<(PathBuf, LoadKind)> {
        match explicit {
            Some(path) => Some((path.to_path_buf(), LoadKind::Selected)),
            None => self
                .sample_package
                .clone()
                .map(|path| (path, LoadKind::Sample)),
        }
    }
}
