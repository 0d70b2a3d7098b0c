use docmap::{
    config::{ConfigError, LogFormat, OdmConfig},
    core::index::OverflowPolicy,
};

#[test]
fn empty_config_uses_defaults() {
    let config = OdmConfig::from_toml_str("").unwrap();

    assert_eq!(config, OdmConfig::default());
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.format, LogFormat::Compact);
    assert_eq!(config.index.workers, 2);
    assert_eq!(config.index.queue_capacity, 1024);
    assert_eq!(config.index.overflow, OverflowPolicy::Block);
}

#[test]
fn full_config_is_read() {
    let config = OdmConfig::from_toml_str(
        r#"
        [logging]
        level = "warn,docmap_core=debug"
        format = "json"

        [index]
        workers = 4
        queue_capacity = 16
        overflow = "reject"
        "#,
    )
    .unwrap();

    assert_eq!(config.logging.level, "warn,docmap_core=debug");
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.index.workers, 4);
    assert_eq!(config.index.queue_capacity, 16);
    assert_eq!(config.index.overflow, OverflowPolicy::Reject);
}

#[test]
fn zero_workers_are_invalid() {
    let err = OdmConfig::from_toml_str("[index]\nworkers = 0\n").unwrap_err();

    assert!(matches!(
        err,
        ConfigError::Invalid {
            field: "index.workers",
            ..
        }
    ));
}

#[test]
fn unknown_keys_and_values_fail_to_parse() {
    let unknown_key = OdmConfig::from_toml_str("[index]\nthreads = 3\n").unwrap_err();
    let unknown_policy = OdmConfig::from_toml_str("[index]\noverflow = \"drop\"\n").unwrap_err();

    assert!(matches!(unknown_key, ConfigError::Parse(_)));
    assert!(matches!(unknown_policy, ConfigError::Parse(_)));
}

#[test]
fn config_file_is_read_from_disk() {
    let path = std::env::temp_dir().join(format!("docmap-config-{}.toml", std::process::id()));
    std::fs::write(&path, "[logging]\nformat = \"json\"\n").unwrap();

    let config = OdmConfig::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn missing_file_is_an_io_error() {
    let err = OdmConfig::from_file("/nonexistent/docmap.toml").unwrap_err();

    assert!(matches!(err, ConfigError::Io { .. }));
}
