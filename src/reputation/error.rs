use std::path::PathBuf;

use thiserror::Error;

/// Raised while loading reputation lists from disk.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read list {}: {source}", path.display())]
    ReadList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    pub(crate) fn read_list(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadList {
            path: path.into(),
            source,
        }
    }
}
