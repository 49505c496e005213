use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Project root resolution
// ---------------------------------------------------------------------------

/// Resolve the project root from the location of a module file.
///
/// The test-support modules live two levels below the repository root
/// (`<root>/src/<module>.rs`), so the root is the second ancestor. Falls
/// back to the file's own directory chain when the ancestry is shallower.
pub fn project_root(module_file: &Path) -> PathBuf {
    module_file
        .parent()
        .and_then(|p| p.parent())
        .unwrap_or(module_file)
        .to_path_buf()
}

// ---------------------------------------------------------------------------
// Search path with idempotent prepend
// ---------------------------------------------------------------------------

/// An ordered, duplicate-free list of directories searched when resolving
/// project resources during a test session.
///
/// Modelled as an explicit value rather than mutation of interpreter-global
/// state so callers (and tests) own the lifetime of the entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    entries: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current entries, highest priority first.
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// Put `dir` at the front unless it is already present anywhere in the
    /// list. Re-invoking with the same directory never duplicates or
    /// reorders entries; returns whether an insertion happened.
    pub fn ensure_prepended(&mut self, dir: &Path) -> bool {
        if self.entries.iter().any(|e| e == dir) {
            return false;
        }
        self.entries.insert(0, dir.to_path_buf());
        true
    }

    /// Convenience: prepend the project root derived from `module_file`.
    pub fn ensure_project_root(&mut self, module_file: &Path) -> bool {
        let root = project_root(module_file);
        self.ensure_prepended(&root)
    }
}
