use lincs_store::logger::init_path;
use std::fs;
use tempfile::tempdir;

#[test]
fn yaml_config_routes_audit_target_to_its_file() {
    let dir = tempdir().unwrap();
    let audit = dir.path().join("audit.log");
    let yaml = format!(
        "appenders:\n  audit:\n    kind: file\n    path: \"{}\"\n    encoder:\n      pattern: \"{{m}}{{n}}\"\n\
         root:\n  level: warn\n  appenders: []\n\
         loggers:\n  lincs::audit:\n    level: info\n    appenders:\n      - audit\n    additive: false\n",
        audit.display()
    );
    let cfg = dir.path().join("log4rs.yaml");
    fs::write(&cfg, yaml).unwrap();
    init_path(&cfg).unwrap();
    log::info!(target: "lincs::audit", "upsert pert zsvc_A375_BRD-K1_10_6");
    log::logger().flush();
    let text = fs::read_to_string(&audit).unwrap();
    assert!(text.contains("upsert pert zsvc_A375_BRD-K1_10_6"));
}
