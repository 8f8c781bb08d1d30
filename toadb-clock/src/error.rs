use thiserror::Error;

/// Error surface for host clock mutation.
#[derive(Debug, Error)]
pub enum ClockError {
    #[error("not permitted to set the host clock: {detail}")]
    PermissionDenied { detail: String },

    #[error("host clock set failed: {detail}")]
    SetFailed { detail: String },

    #[error("I/O error running `{command}`: {source}")]
    Io {
        command: &'static str,
        #[source]
        source: std::io::Error,
    },
}
