use lincs_store::config::{Config, Environment, StoreConfig};
use lincs_store::errors::DbError;
use std::collections::HashMap;
use std::fs;
use tempfile::tempdir;

const TOML: &str = r#"
[prod]
version = "1.0"

[prod.store]
address = "10.0.0.1"
bucket = "LINCS"

[devel]
version = "1.1"

[devel.store]
address = "127.0.0.1"
port = 18091
bucket = "LINCS_DEV"
password = "s3cret"
"#;

fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> =
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
    move |k: &str| map.get(k).cloned()
}

#[test]
fn defaults_match_original_deployment() {
    let cfg = Config::default();
    assert_eq!(cfg.store.address, "10.152.220.31");
    assert_eq!(cfg.store.port, 8091);
    assert_eq!(cfg.store.bucket, "LINCS");
    assert_eq!(cfg.store.password, None);
    assert_eq!(cfg.store.connection_timeout_ms, 5000);
    assert_eq!(cfg.store.operation_timeout_ms, 5000);
    assert_eq!(cfg.store.url(), "couchbase://10.152.220.31:8091");
}

#[test]
fn environment_selection() {
    assert_eq!(Environment::from_lookup(vars(&[])), Environment::Prod);
    assert_eq!(Environment::from_lookup(vars(&[("LINCS_DEVEL", "1")])), Environment::Devel);
    assert_eq!(Environment::from_lookup(vars(&[("LINCS_DEVEL", "")])), Environment::Prod);
}

#[test]
fn sections_parse_with_field_defaults() {
    let prod = Config::from_toml_str(TOML, Environment::Prod).unwrap();
    assert_eq!(prod.store.address, "10.0.0.1");
    assert_eq!(prod.store.port, 8091);
    let devel = Config::from_toml_str(TOML, Environment::Devel).unwrap();
    assert_eq!(devel.version, "1.1");
    assert_eq!(devel.store.port, 18091);
    assert_eq!(devel.store.password.as_deref(), Some("s3cret"));
}

#[test]
fn missing_section_falls_back_to_defaults() {
    let cfg = Config::from_toml_str("[prod]\nversion = \"2\"\n", Environment::Devel).unwrap();
    assert_eq!(cfg, Config::default());
}

#[test]
fn load_with_explicit_path_and_overrides() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lincs.toml");
    fs::write(&path, TOML).unwrap();

    let cfg = Config::load_with(Some(&path), vars(&[("LINCS_DEVEL", "yes")])).unwrap();
    assert_eq!(cfg.store.bucket, "LINCS_DEV");

    let cfg = Config::load_with(
        Some(&path),
        vars(&[("LINCS_BUCKET", "OTHER"), ("LINCS_PASSWORD", "pw"), ("LINCS_ADDRESS", "db.local")]),
    )
    .unwrap();
    assert_eq!(
        cfg.store,
        StoreConfig {
            address: "db.local".into(),
            bucket: "OTHER".into(),
            password: Some("pw".into()),
            ..StoreConfig::default()
        }
    );
}

#[test]
fn load_with_config_variable() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    fs::write(&path, TOML).unwrap();
    let p = path.to_string_lossy().to_string();
    let cfg = Config::load_with(None, vars(&[("LINCS_CONFIG", p.as_str())])).unwrap();
    assert_eq!(cfg.store.address, "10.0.0.1");
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = tempdir().unwrap();
    let e = Config::load_with(Some(&dir.path().join("nope.toml")), vars(&[])).unwrap_err();
    assert!(matches!(e, DbError::Config(_)));
}

#[test]
fn malformed_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[prod\nversion = ").unwrap();
    let e = Config::load_with(Some(&path), vars(&[])).unwrap_err();
    assert!(matches!(e, DbError::Toml(_)));
}
