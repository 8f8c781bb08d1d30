//! Error types for toadb-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from selection-store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error (write/save path).
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON parse error on load — includes the file path for context.
    #[error("failed to parse selection at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// `dirs::config_dir()` returned `None` — cannot locate the state dir.
    #[error("cannot determine config directory; set $XDG_CONFIG_HOME or equivalent")]
    ConfigDirNotFound,
}
