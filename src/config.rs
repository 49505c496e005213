use std::path::Path;

use serde::Deserialize;

use crate::error::BootstrapError;
use crate::paths::SearchPath;

/// Name of the optional sibling config file, looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "spectra.bootstrap.json";

/// Environment variable that disables automated numpy installation.
pub const SKIP_ENV_VAR: &str = "SPECTRA_SKIP_AUTO_NUMPY";

/// Environment variable overriding the Python interpreter used for probing
/// and installation.
pub const PYTHON_ENV_VAR: &str = "SPECTRA_PYTHON";

// ---------------------------------------------------------------------------
// Sibling bootstrap configuration
// ---------------------------------------------------------------------------

/// Optional per-checkout bootstrap overrides, read once at session start.
///
/// Every field is optional; an absent file yields the all-`None` default.
/// A present-but-unreadable file is a configuration error (silently
/// ignoring a typo'd override would defeat its purpose).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Override for the numpy requirement, e.g. `"numpy>=2,<3"`. Takes
    /// precedence over the built-in default when set.
    pub numpy_spec: Option<String>,

    /// Custom install command run instead of pip when numpy is missing,
    /// as `[program, arg, ...]`. Its success is trusted without a re-probe.
    pub bootstrap_command: Option<Vec<String>>,
}

impl BootstrapConfig {
    /// Load `spectra.bootstrap.json` from `root`, falling back to defaults
    /// when the file does not exist.
    pub fn load(root: &Path) -> Result<Self, BootstrapError> {
        let path = root.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path)
            .map_err(|e| BootstrapError::Config(format!("reading {}: {e}", path.display())))?;
        serde_json::from_str(&text)
            .map_err(|e| BootstrapError::Config(format!("parsing {}: {e}", path.display())))
    }

    /// Locate the config file along the session search path (first hit
    /// wins); no hit anywhere yields the defaults.
    pub fn locate(search: &SearchPath) -> Result<Self, BootstrapError> {
        for dir in search.entries() {
            if dir.join(CONFIG_FILE_NAME).exists() {
                return Self::load(dir);
            }
        }
        Ok(Self::default())
    }
}

// ---------------------------------------------------------------------------
// Session environment
// ---------------------------------------------------------------------------

/// The slice of the process environment the bootstrap consults, captured
/// once so the procedure itself never touches global env state.
#[derive(Debug, Clone)]
pub struct SessionEnv {
    /// `SPECTRA_SKIP_AUTO_NUMPY` is set to a non-empty value.
    pub skip_auto_install: bool,

    /// Interpreter used for probing and `pip install` (default `python3`).
    pub python: String,
}

impl SessionEnv {
    pub fn from_process_env() -> Self {
        let skip_auto_install = std::env::var(SKIP_ENV_VAR)
            .map(|v| !v.is_empty())
            .unwrap_or(false);
        let python = std::env::var(PYTHON_ENV_VAR)
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "python3".to_string());
        Self {
            skip_auto_install,
            python,
        }
    }
}

impl Default for SessionEnv {
    fn default() -> Self {
        Self {
            skip_auto_install: false,
            python: "python3".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = BootstrapConfig::load(dir.path()).unwrap();
        assert!(config.numpy_spec.is_none());
        assert!(config.bootstrap_command.is_none());
    }

    #[test]
    fn missing_fields_fall_back_to_none() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{"numpy_spec": "numpy>=2,<3"}"#,
        )
        .unwrap();
        let config = BootstrapConfig::load(dir.path()).unwrap();
        assert_eq!(config.numpy_spec.as_deref(), Some("numpy>=2,<3"));
        assert!(config.bootstrap_command.is_none());
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "{not json").unwrap();
        let err = BootstrapConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, crate::error::BootstrapError::Config(_)));
    }
}
