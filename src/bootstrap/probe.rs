use std::cmp::Ordering;
use std::fmt;

use anyhow::{bail, Context, Result};

// ---------------------------------------------------------------------------
// Version – dotted release numbers as reported by `module.__version__`
// ---------------------------------------------------------------------------

/// A parsed release version (`1.26.4`, `3.0.0rc1`, ...).
///
/// Ordering compares numeric components with zero-extension, so
/// `1.26 == 1.26.0 < 1.26.4 < 2`. Non-numeric suffixes within a component
/// are ignored; that is good enough for range checks against the pinned
/// numpy spec.
#[derive(Debug, Clone)]
pub struct Version {
    parts: Vec<u64>,
    raw: String,
}

impl Version {
    pub fn parse(s: &str) -> Option<Self> {
        let raw = s.trim().to_string();
        let mut parts = Vec::new();
        for comp in raw.split('.') {
            let digits: String = comp.chars().take_while(|c| c.is_ascii_digit()).collect();
            if digits.is_empty() {
                break;
            }
            parts.push(digits.parse().ok()?);
        }
        if parts.is_empty() {
            return None;
        }
        Some(Self { parts, raw })
    }
}

// Manual Eq/Ord: `1.26` and `1.26.0` must compare equal, so the derived
// field-wise equality (which would also compare `raw`) is wrong here.

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.parts.len().max(other.parts.len());
        for i in 0..len {
            let a = self.parts.get(i).copied().unwrap_or(0);
            let b = other.parts.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        Ordering::Equal
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

// ---------------------------------------------------------------------------
// DependencySpec – pip-style requirement string
// ---------------------------------------------------------------------------

/// A version-constrained package requirement, e.g. `numpy>=1.26,<3`.
///
/// Only the operators the bootstrap actually pins with are supported:
/// `>=` (inclusive lower bound) and `<` (exclusive upper bound). A bare
/// package name means "any version".
#[derive(Debug, Clone)]
pub struct DependencySpec {
    name: String,
    min_inclusive: Option<Version>,
    max_exclusive: Option<Version>,
    raw: String,
}

impl DependencySpec {
    pub fn parse(s: &str) -> Result<Self> {
        let raw = s.trim().to_string();
        let split = raw
            .find(|c: char| ['<', '>', '=', '!', '~'].contains(&c))
            .unwrap_or(raw.len());
        let name = raw[..split].trim().to_string();
        if name.is_empty() {
            bail!("requirement '{raw}' has no package name");
        }

        let mut min_inclusive = None;
        let mut max_exclusive = None;
        let rest = &raw[split..];
        for constraint in rest.split(',').map(str::trim).filter(|c| !c.is_empty()) {
            if let Some(v) = constraint.strip_prefix(">=") {
                min_inclusive = Some(
                    Version::parse(v).with_context(|| format!("bad lower bound '{v}' in '{raw}'"))?,
                );
            } else if let Some(v) = constraint.strip_prefix('<') {
                max_exclusive = Some(
                    Version::parse(v).with_context(|| format!("bad upper bound '{v}' in '{raw}'"))?,
                );
            } else {
                bail!("unsupported constraint '{constraint}' in '{raw}' (only >= and < are understood)");
            }
        }

        Ok(Self {
            name,
            min_inclusive,
            max_exclusive,
            raw,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether `version` satisfies both bounds.
    pub fn matches(&self, version: &Version) -> bool {
        if let Some(min) = &self.min_inclusive {
            if version < min {
                return false;
            }
        }
        if let Some(max) = &self.max_exclusive {
            if version >= max {
                return false;
            }
        }
        true
    }
}

impl fmt::Display for DependencySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

// ---------------------------------------------------------------------------
// Probe – explicit capability tri-state
// ---------------------------------------------------------------------------

/// Result of probing for the numeric backend.
///
/// An explicit tri-state instead of treating import failure as control
/// flow: callers can distinguish "not there" from "there but outside the
/// pinned range".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// Importable and inside the requested range.
    Available(Version),
    /// Not importable at all.
    Absent,
    /// Importable but the found version violates the spec bounds.
    VersionMismatch { found: Version },
}
