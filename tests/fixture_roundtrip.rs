//! Round-trip acceptance for the FITS ingestion fixture: the file a test
//! receives must read back with columns, units, and header keywords intact.

use spectra_testkit::fixture;

#[cfg(feature = "fits")]
#[test]
fn mini_fits_round_trips() {
    if !fixture::fits_available() {
        eprintln!("Skipping FITS round-trip test - fits feature not compiled in");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let path = fixture::mini_fits(dir.path()).unwrap();
    assert_eq!(path.file_name().unwrap(), "mini.fits");

    let table = fixture::fits::read_table(&path).unwrap();
    assert_eq!(table.extname.as_deref(), Some("SPECTRUM"));
    assert_eq!(table.columns.len(), 2);

    let wavelength = &table.columns[0];
    assert_eq!(wavelength.name, "WAVELENGTH");
    assert_eq!(wavelength.unit.as_deref(), Some("nm"));
    assert_eq!(wavelength.values, [500.0, 600.0, 700.0]);

    let flux = &table.columns[1];
    assert_eq!(flux.name, "FLUX");
    assert_eq!(flux.unit.as_deref(), Some("erg/s/cm2/angstrom"));
    assert_eq!(flux.values, [0.1, 0.2, 0.3]);

    assert_eq!(
        table.keywords.get("OBJECT").map(String::as_str),
        Some("MiniFixture")
    );
    assert_eq!(
        table.keywords.get("INSTRUME").map(String::as_str),
        Some("TestSpec")
    );
    assert_eq!(
        table.keywords.get("BUNIT").map(String::as_str),
        Some("erg/s/cm2/angstrom")
    );
}

#[cfg(feature = "fits")]
#[test]
fn each_test_gets_its_own_file() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();

    let pa = fixture::mini_fits(a.path()).unwrap();
    let pb = fixture::mini_fits(b.path()).unwrap();
    assert_ne!(pa, pb);
    assert_eq!(
        std::fs::read(&pa).unwrap(),
        std::fs::read(&pb).unwrap(),
        "fixture content is deterministic"
    );
}

#[cfg(not(feature = "fits"))]
#[test]
fn fixture_request_skips_without_format_support() {
    use spectra_testkit::error::FixtureError;

    assert!(!fixture::fits_available());
    let dir = tempfile::tempdir().unwrap();
    match fixture::mini_fits(dir.path()) {
        Err(FixtureError::FormatSupportMissing) => {
            // The skip path: absence of the optional format support must
            // not fail the requesting test.
            eprintln!("Skipping FITS fixture test - fits feature not compiled in");
        }
        other => panic!("expected FormatSupportMissing, got {other:?}"),
    }
}
