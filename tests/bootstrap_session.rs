//! Session-level bootstrap flow, driven end to end through the injectable
//! seams: search path -> sibling config -> probe -> install -> re-probe.

use spectra_testkit::bootstrap::probe::{Probe, Version};
use spectra_testkit::bootstrap::{ensure_numeric_backend, BootstrapOutcome};
use spectra_testkit::config::{BootstrapConfig, SessionEnv, CONFIG_FILE_NAME};
use spectra_testkit::error::BootstrapError;
use spectra_testkit::paths::SearchPath;
use spectra_testkit::testing::{RecordingRunner, ScriptedResolver};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn available(v: &str) -> Probe {
    Probe::Available(Version::parse(v).unwrap())
}

#[test]
fn session_bootstrap_with_sibling_config_override() {
    init_logging();

    // A checkout whose root carries a spectra.bootstrap.json override.
    let checkout = tempfile::tempdir().unwrap();
    std::fs::write(
        checkout.path().join(CONFIG_FILE_NAME),
        r#"{"numpy_spec": "numpy>=2,<3"}"#,
    )
    .unwrap();

    // Path bootstrap: the module two levels below the root puts the root
    // on the search path, repeatably.
    let module_file = checkout.path().join("tests").join("session.rs");
    let mut search = SearchPath::new();
    assert!(search.ensure_project_root(&module_file));
    assert!(!search.ensure_project_root(&module_file));
    assert_eq!(search.entries(), [checkout.path().to_path_buf()]);

    let config = BootstrapConfig::locate(&search).unwrap();
    assert_eq!(config.numpy_spec.as_deref(), Some("numpy>=2,<3"));

    let mut resolver = ScriptedResolver::new(Probe::Absent, available("2.2.1"));
    let runner = RecordingRunner::default();
    let outcome =
        ensure_numeric_backend(&mut resolver, &runner, &config, &SessionEnv::default()).unwrap();

    assert_eq!(outcome, BootstrapOutcome::SatisfiedViaInstall);
    let calls = runner.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].last().unwrap(), "numpy>=2,<3");
}

#[test]
fn session_bootstrap_without_config_uses_default_pin() {
    init_logging();

    let checkout = tempfile::tempdir().unwrap();
    let mut search = SearchPath::new();
    search.ensure_prepended(checkout.path());

    let config = BootstrapConfig::locate(&search).unwrap();
    assert!(config.numpy_spec.is_none());

    let mut resolver = ScriptedResolver::new(available("1.26.4"), available("1.26.4"));
    let runner = RecordingRunner::default();
    let outcome =
        ensure_numeric_backend(&mut resolver, &runner, &config, &SessionEnv::default()).unwrap();

    assert_eq!(outcome, BootstrapOutcome::AlreadySatisfied);
    assert_eq!(runner.call_count(), 0);
}

#[test]
fn opt_out_message_names_flag_and_remedy() {
    init_logging();

    let mut resolver = ScriptedResolver::new(Probe::Absent, Probe::Absent);
    let runner = RecordingRunner::default();
    let env = SessionEnv {
        skip_auto_install: true,
        python: "/opt/py/bin/python".to_string(),
    };

    let err = ensure_numeric_backend(&mut resolver, &runner, &BootstrapConfig::default(), &env)
        .unwrap_err();

    assert!(matches!(err, BootstrapError::AutoInstallDisabled { .. }));
    let msg = err.to_string();
    assert!(msg.contains("SPECTRA_SKIP_AUTO_NUMPY"));
    assert!(msg.contains("/opt/py/bin/python -m pip install --prefer-binary numpy>=1.26,<3"));
    assert_eq!(runner.call_count(), 0);
}

#[test]
fn failed_install_chains_the_process_error() {
    init_logging();

    let mut resolver = ScriptedResolver::new(Probe::Absent, Probe::Absent);
    let runner = RecordingRunner::failing();

    let err = ensure_numeric_backend(
        &mut resolver,
        &runner,
        &BootstrapConfig::default(),
        &SessionEnv::default(),
    )
    .unwrap_err();

    assert!(matches!(err, BootstrapError::InstallFailed { .. }));
    assert!(err
        .to_string()
        .contains("python3 -m pip install --prefer-binary numpy>=1.26,<3"));

    let cause = std::error::Error::source(&err).expect("cause preserved");
    assert!(cause.to_string().contains("exit status"));
}

#[test]
fn hook_from_config_is_trusted() {
    init_logging();

    let checkout = tempfile::tempdir().unwrap();
    std::fs::write(
        checkout.path().join(CONFIG_FILE_NAME),
        r#"{"bootstrap_command": ["bash", "tools/get_numpy.sh"]}"#,
    )
    .unwrap();
    let mut search = SearchPath::new();
    search.ensure_prepended(checkout.path());
    let config = BootstrapConfig::locate(&search).unwrap();

    let mut resolver = ScriptedResolver::new(Probe::Absent, Probe::Absent);
    let runner = RecordingRunner::default();
    let outcome =
        ensure_numeric_backend(&mut resolver, &runner, &config, &SessionEnv::default()).unwrap();

    assert_eq!(outcome, BootstrapOutcome::SatisfiedViaHook);
    assert_eq!(
        *runner.calls.borrow(),
        [vec!["bash".to_string(), "tools/get_numpy.sh".to_string()]]
    );
    // The hook path never touches the resolver cache.
    assert_eq!(resolver.invalidations, 0);
}

#[test]
fn config_lookup_prefers_earlier_search_entries() {
    init_logging();

    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    std::fs::write(
        first.path().join(CONFIG_FILE_NAME),
        r#"{"numpy_spec": "numpy>=2,<3"}"#,
    )
    .unwrap();
    std::fs::write(
        second.path().join(CONFIG_FILE_NAME),
        r#"{"numpy_spec": "numpy>=1.20,<2"}"#,
    )
    .unwrap();

    let mut search = SearchPath::new();
    search.ensure_prepended(second.path());
    search.ensure_prepended(first.path());

    let config = BootstrapConfig::locate(&search).unwrap();
    assert_eq!(config.numpy_spec.as_deref(), Some("numpy>=2,<3"));
}
