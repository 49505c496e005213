use std::collections::BTreeMap;
use std::process::Command;

use super::probe::{DependencySpec, Probe, Version};

// ---------------------------------------------------------------------------
// ModuleResolver – injectable probe seam
// ---------------------------------------------------------------------------

/// Answers "is this package importable, and at which version?".
///
/// An explicit interface (instead of poking process-global import state)
/// so the bootstrap procedure can be driven by a scripted resolver in
/// tests. The production implementation caches probe results; the cache
/// only ever shrinks through [`ModuleResolver::invalidate_cache`], which
/// the bootstrap calls after an install so a fresh probe sees the new
/// package.
pub trait ModuleResolver {
    fn probe(&mut self, spec: &DependencySpec) -> Probe;

    /// Drop any memoized probe results.
    fn invalidate_cache(&mut self);
}

// ---------------------------------------------------------------------------
// PythonResolver – production implementation
// ---------------------------------------------------------------------------

/// Probes by asking the project's Python interpreter for the module's
/// `__version__`. A failed launch or non-zero exit both count as
/// [`Probe::Absent`]; the distinction does not matter to the bootstrap.
pub struct PythonResolver {
    python: String,
    cache: BTreeMap<String, Option<Version>>,
}

impl PythonResolver {
    pub fn new(python: &str) -> Self {
        Self {
            python: python.to_string(),
            cache: BTreeMap::new(),
        }
    }

    fn query_version(&self, module: &str) -> Option<Version> {
        let code = format!("import {module}; print({module}.__version__)");
        let output = match Command::new(&self.python).arg("-c").arg(&code).output() {
            Ok(output) => output,
            Err(e) => {
                log::warn!("could not launch {} to probe for {module}: {e}", self.python);
                return None;
            }
        };
        if !output.status.success() {
            return None;
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        Version::parse(stdout.trim())
    }
}

impl ModuleResolver for PythonResolver {
    fn probe(&mut self, spec: &DependencySpec) -> Probe {
        let name = spec.name().to_string();
        let found = match self.cache.get(&name) {
            Some(cached) => cached.clone(),
            None => {
                let queried = self.query_version(&name);
                self.cache.insert(name, queried.clone());
                queried
            }
        };
        match found {
            None => Probe::Absent,
            Some(v) if spec.matches(&v) => Probe::Available(v),
            Some(v) => Probe::VersionMismatch { found: v },
        }
    }

    fn invalidate_cache(&mut self) {
        self.cache.clear();
    }
}
