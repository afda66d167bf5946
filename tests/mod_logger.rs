use lincs_store::logger::{configure_logging, parse_level};
use log::LevelFilter;
use tempfile::tempdir;

#[test]
fn level_names_parse_case_insensitively() {
    assert_eq!(parse_level("DEBUG"), LevelFilter::Debug);
    assert_eq!(parse_level("warn"), LevelFilter::Warn);
    assert_eq!(parse_level("Error"), LevelFilter::Error);
    assert_eq!(parse_level("trace"), LevelFilter::Trace);
    assert_eq!(parse_level("verbose"), LevelFilter::Info);
}

#[test]
fn configure_logging_creates_split_files() {
    let dir = tempdir().unwrap();
    configure_logging(Some(dir.path()), Some("debug"), Some(2)).unwrap();
    log::info!(target: "lincs::audit", "op=save_pert key=test");
    log::info!(target: "lincs::metrics", "op=count rows=0");
    log::info!("plain");
    for name in ["app.log", "audit.log", "metrics.log"] {
        assert!(dir.path().join(name).exists(), "{name} missing");
    }
    // reconfiguring swaps the running config instead of failing
    let other = tempdir().unwrap();
    configure_logging(Some(other.path()), None, None).unwrap();
    assert!(other.path().join("app.log").exists());
}
