use std::process::Command;

use crate::error::InstallRunError;

use super::probe::DependencySpec;

// ---------------------------------------------------------------------------
// InstallRunner – injectable subprocess seam
// ---------------------------------------------------------------------------

/// Runs an install command to completion.
///
/// Kept behind a trait so tests can observe exactly which commands the
/// bootstrap would spawn (and force failures) without launching anything.
pub trait InstallRunner {
    fn run(&self, command: &[String]) -> Result<(), InstallRunError>;
}

/// Render a command line the way it appears in error messages and docs.
pub fn render_command(command: &[String]) -> String {
    command.join(" ")
}

/// The pip invocation used for automated installs:
/// `{python} -m pip install --prefer-binary {spec}`.
///
/// `--prefer-binary` keeps CI fast by avoiding source builds of numpy.
pub fn pip_install_command(python: &str, spec: &DependencySpec) -> Vec<String> {
    vec![
        python.to_string(),
        "-m".to_string(),
        "pip".to_string(),
        "install".to_string(),
        "--prefer-binary".to_string(),
        spec.to_string(),
    ]
}

// ---------------------------------------------------------------------------
// PipRunner – production implementation
// ---------------------------------------------------------------------------

/// Spawns the command as a child process, inheriting stdio so installer
/// output lands in the test-session log, and blocks until it exits. No
/// timeout: a hung installer hangs the session (accepted limitation).
pub struct PipRunner;

impl InstallRunner for PipRunner {
    fn run(&self, command: &[String]) -> Result<(), InstallRunError> {
        let rendered = render_command(command);
        let (program, args) = command.split_first().ok_or_else(|| InstallRunError::Spawn {
            command: rendered.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
        })?;

        log::info!("running `{rendered}`");
        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|source| InstallRunError::Spawn {
                command: rendered.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(InstallRunError::NonZero {
                command: rendered,
                status: status.to_string(),
            })
        }
    }
}
