//! Test doubles for the bootstrap seams.
//!
//! Shared between the unit tests and the `tests/` integration suite so the
//! dependency bootstrap can be exercised without spawning processes or
//! touching a real Python environment.

use std::cell::RefCell;

use crate::bootstrap::probe::{DependencySpec, Probe};
use crate::bootstrap::resolver::ModuleResolver;
use crate::bootstrap::runner::InstallRunner;
use crate::error::InstallRunError;

/// A resolver that answers from a script: one probe result before the cache
/// is invalidated, another afterwards. Counts probes and invalidations.
pub struct ScriptedResolver {
    pub before_install: Probe,
    pub after_install: Probe,
    pub probes: usize,
    pub invalidations: usize,
}

impl ScriptedResolver {
    pub fn new(before_install: Probe, after_install: Probe) -> Self {
        Self {
            before_install,
            after_install,
            probes: 0,
            invalidations: 0,
        }
    }
}

impl ModuleResolver for ScriptedResolver {
    fn probe(&mut self, _spec: &DependencySpec) -> Probe {
        self.probes += 1;
        if self.invalidations > 0 {
            self.after_install.clone()
        } else {
            self.before_install.clone()
        }
    }

    fn invalidate_cache(&mut self) {
        self.invalidations += 1;
    }
}

/// A runner that records every command instead of spawning it, optionally
/// failing each invocation with a scripted non-zero exit.
#[derive(Default)]
pub struct RecordingRunner {
    pub calls: RefCell<Vec<Vec<String>>>,
    pub fail: bool,
}

impl RecordingRunner {
    pub fn failing() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            fail: true,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl InstallRunner for RecordingRunner {
    fn run(&self, command: &[String]) -> Result<(), InstallRunError> {
        self.calls.borrow_mut().push(command.to_vec());
        if self.fail {
            Err(InstallRunError::NonZero {
                command: command.join(" "),
                status: "exit status: 1".to_string(),
            })
        } else {
            Ok(())
        }
    }
}
