//! Numeric-backend bootstrap.
//!
//! Guarantees numpy is importable by the project's Python interpreter
//! before the first ingestion test collects. Runs once, synchronously, at
//! session start:
//!
//! ```text
//!   probe ──available──────────────────────────▶ AlreadySatisfied
//!     │ absent / version mismatch
//!     ├─ config hook set ──run hook───────────▶ SatisfiedViaHook
//!     ├─ SPECTRA_SKIP_AUTO_NUMPY ─────────────▶ error (manual remedy)
//!     └─ pip install --prefer-binary <spec>
//!              │ non-zero exit ───────────────▶ error (manual remedy + cause)
//!              └─ invalidate cache, re-probe ─▶ SatisfiedViaInstall | error
//! ```

pub mod probe;
pub mod resolver;
pub mod runner;

use std::path::Path;

use crate::config::{BootstrapConfig, SessionEnv};
use crate::error::BootstrapError;
use crate::paths;

use self::probe::{DependencySpec, Probe};
use self::resolver::{ModuleResolver, PythonResolver};
use self::runner::{pip_install_command, render_command, InstallRunner, PipRunner};

/// Requirement used when the sibling config file supplies no override.
/// Kept aligned with `requirements.txt`.
pub const DEFAULT_NUMPY_SPEC: &str = "numpy>=1.26,<3";

/// How a bootstrap run satisfied the numpy requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// Importable up front; nothing was spawned.
    AlreadySatisfied,
    /// The configured bootstrap command ran and was trusted.
    SatisfiedViaHook,
    /// pip installed it and the re-probe confirmed it.
    SatisfiedViaInstall,
}

/// Ensure numpy is importable, installing it if necessary.
///
/// The seams (`resolver`, `runner`, `config`, `env`) are injected so tests
/// can script every branch; production callers use
/// [`ensure_numeric_backend_default`]. At most one child process is
/// spawned, and only when the probe does not come back
/// [`Probe::Available`]. Not designed for concurrent invocation.
pub fn ensure_numeric_backend(
    resolver: &mut dyn ModuleResolver,
    runner: &dyn InstallRunner,
    config: &BootstrapConfig,
    env: &SessionEnv,
) -> Result<BootstrapOutcome, BootstrapError> {
    let raw_spec = config.numpy_spec.as_deref().unwrap_or(DEFAULT_NUMPY_SPEC);
    let spec = DependencySpec::parse(raw_spec)
        .map_err(|e| BootstrapError::Config(format!("numpy requirement: {e:#}")))?;

    match resolver.probe(&spec) {
        Probe::Available(version) => {
            log::info!("numpy {version} already available; nothing to do");
            return Ok(BootstrapOutcome::AlreadySatisfied);
        }
        Probe::Absent => log::info!("numpy not importable; bootstrapping {spec}"),
        // An out-of-range install is treated like an absent one: pip is
        // allowed to move the version into the pinned range.
        Probe::VersionMismatch { found } => {
            log::warn!("numpy {found} is outside {spec}; reinstalling");
        }
    }

    if let Some(hook) = &config.bootstrap_command {
        let rendered = render_command(hook);
        log::info!("delegating numpy install to configured hook `{rendered}`");
        runner
            .run(hook)
            .map_err(|source| BootstrapError::InstallFailed {
                command: rendered,
                source,
            })?;
        // Trust-the-hook contract: a clean exit is accepted without a
        // re-probe. The hook owns its environment; a wrong install shows
        // up as an import failure in the first test that needs numpy.
        return Ok(BootstrapOutcome::SatisfiedViaHook);
    }

    let command = pip_install_command(&env.python, &spec);
    let rendered = render_command(&command);

    if env.skip_auto_install {
        return Err(BootstrapError::AutoInstallDisabled { command: rendered });
    }

    runner
        .run(&command)
        .map_err(|source| BootstrapError::InstallFailed {
            command: rendered,
            source,
        })?;

    resolver.invalidate_cache();
    match resolver.probe(&spec) {
        Probe::Available(version) => {
            log::info!("numpy {version} installed");
            Ok(BootstrapOutcome::SatisfiedViaInstall)
        }
        Probe::Absent => Err(BootstrapError::StillMissing {
            detail: "the install reported success but numpy does not import".to_string(),
        }),
        Probe::VersionMismatch { found } => Err(BootstrapError::StillMissing {
            detail: format!("the install resolved numpy {found}, outside {spec}"),
        }),
    }
}

/// Production entry point: wires the real Python resolver, pip runner,
/// sibling config file, and process environment, then delegates to
/// [`ensure_numeric_backend`].
///
/// The project root goes onto the session search path first so the
/// sibling `spectra.bootstrap.json` can be located through it.
pub fn ensure_numeric_backend_default() -> Result<BootstrapOutcome, BootstrapError> {
    let mut search = paths::SearchPath::new();
    search.ensure_prepended(Path::new(env!("CARGO_MANIFEST_DIR")));
    let config = BootstrapConfig::locate(&search)?;
    let env = SessionEnv::from_process_env();
    let mut resolver = PythonResolver::new(&env.python);
    ensure_numeric_backend(&mut resolver, &PipRunner, &config, &env)
}
