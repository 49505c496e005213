//! Test-support crate for the Spectra spectral data project.
//!
//! Two jobs, both performed before or during the test session:
//!
//! * [`bootstrap`] guarantees the numeric backend (numpy, used by the
//!   ingestion pipeline's Python side) is importable before the first
//!   test collects, installing it via pip when missing.
//! * [`fixture`] synthesizes the minimal FITS file the ingestion smoke
//!   tests read back.
//!
//! Call [`ensure_numeric_backend_default`] once at session start; request
//! fixtures per test via [`fixture::mini_fits`].

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod fixture;
pub mod paths;
pub mod testing;

pub use bootstrap::{ensure_numeric_backend, ensure_numeric_backend_default, BootstrapOutcome};
pub use error::{BootstrapError, FixtureError};
