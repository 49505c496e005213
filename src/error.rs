use thiserror::Error;

// ---------------------------------------------------------------------------
// Bootstrap errors (usage-level: the operator must act)
// ---------------------------------------------------------------------------

/// Failure modes of the numeric-backend bootstrap.
///
/// Every variant that reaches a user carries the concrete remedy in its
/// message; nothing is swallowed or retried.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// numpy is missing and `SPECTRA_SKIP_AUTO_NUMPY` disables auto-install.
    #[error(
        "numpy is not importable and automated install is disabled by \
         SPECTRA_SKIP_AUTO_NUMPY; install it manually with `{command}`, \
         or unset SPECTRA_SKIP_AUTO_NUMPY to let the test session install it"
    )]
    AutoInstallDisabled { command: String },

    /// The install child process (pip or a configured hook) failed.
    #[error("automated numpy install failed; run `{command}` manually and re-run the tests")]
    InstallFailed {
        command: String,
        #[source]
        source: InstallRunError,
    },

    /// Install reported success but the re-probe still cannot find numpy.
    /// Deliberately terminal: not retried, not translated further.
    #[error("numpy is still unavailable after a successful install: {detail}")]
    StillMissing { detail: String },

    /// The sibling bootstrap config file exists but cannot be used.
    #[error("invalid bootstrap configuration: {0}")]
    Config(String),
}

/// Failure of a single install-command invocation.
#[derive(Debug, Error)]
pub enum InstallRunError {
    #[error("failed to launch `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}")]
    NonZero { command: String, status: String },
}

// ---------------------------------------------------------------------------
// Fixture errors
// ---------------------------------------------------------------------------

/// Failure modes of the FITS fixture factory and codec.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The crate was built without the `fits` feature. Requesting tests
    /// treat this as a skip, never a failure.
    #[error("FITS fixture support is not compiled in (enable the `fits` feature)")]
    FormatSupportMissing,

    #[error("FITS fixture I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed FITS data: {0}")]
    Malformed(String),
}
