//! FITS fixture factory for ingestion smoke tests.
//!
//! Produces `mini.fits`: an empty primary HDU plus one binary table with a
//! three-sample spectrum, written into a per-test temporary directory
//! owned by the caller. The codec sits behind the `fits` cargo feature;
//! without it the factory reports [`FixtureError::FormatSupportMissing`]
//! and requesting tests skip instead of failing.

#[cfg(feature = "fits")]
pub mod fits;

use std::path::{Path, PathBuf};

use crate::error::FixtureError;

pub const FIXTURE_FILE_NAME: &str = "mini.fits";

pub const WAVELENGTHS_NM: [f64; 3] = [500.0, 600.0, 700.0];
pub const FLUXES: [f64; 3] = [0.1, 0.2, 0.3];

pub const WAVELENGTH_UNIT: &str = "nm";
pub const FLUX_UNIT: &str = "erg/s/cm2/angstrom";
pub const OBJECT_NAME: &str = "MiniFixture";
pub const INSTRUMENT_NAME: &str = "TestSpec";
pub const EXTENSION_NAME: &str = "SPECTRUM";

/// Whether FITS fixture support was compiled in.
pub fn fits_available() -> bool {
    cfg!(feature = "fits")
}

/// Write the minimal spectrum fixture into `dir` and return its path.
///
/// `dir` is expected to be a per-test temporary directory; the file is
/// created fresh on every call and never shared across tests.
#[cfg(feature = "fits")]
pub fn mini_fits(dir: &Path) -> Result<PathBuf, FixtureError> {
    use std::collections::BTreeMap;

    use self::fits::{FitsColumn, FitsTable};

    let table = FitsTable {
        extname: Some(EXTENSION_NAME.to_string()),
        columns: vec![
            FitsColumn {
                name: "WAVELENGTH".to_string(),
                unit: Some(WAVELENGTH_UNIT.to_string()),
                values: WAVELENGTHS_NM.to_vec(),
            },
            FitsColumn {
                name: "FLUX".to_string(),
                unit: Some(FLUX_UNIT.to_string()),
                values: FLUXES.to_vec(),
            },
        ],
        keywords: BTreeMap::from([
            ("OBJECT".to_string(), OBJECT_NAME.to_string()),
            ("INSTRUME".to_string(), INSTRUMENT_NAME.to_string()),
            ("BUNIT".to_string(), FLUX_UNIT.to_string()),
        ]),
    };

    let path = dir.join(FIXTURE_FILE_NAME);
    fits::write_table(&path, &table)?;
    log::info!("wrote FITS fixture {}", path.display());
    Ok(path)
}

#[cfg(not(feature = "fits"))]
pub fn mini_fits(_dir: &Path) -> Result<PathBuf, FixtureError> {
    Err(FixtureError::FormatSupportMissing)
}
