use sprout_kernel::config::{ConfigError, load_config_from};
use sprout_kernel::domain::config::{ApiConfig, DEFAULT_PORT};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
}

fn write_toml(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("server.toml");
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn defaults_apply_without_file_or_env() {
    let dir = TempDir::new().unwrap();
    let cfg: ApiConfig = load_config_from(Some(dir.path().join("absent")), env(&[])).unwrap();

    assert_eq!(cfg.server.port, DEFAULT_PORT);
    assert_eq!(cfg.storage.registry_file, Path::new("data/emails.json"));
    assert!(cfg.server.ssl.is_none());
}

#[test]
fn file_values_are_read() {
    let dir = TempDir::new().unwrap();
    let path = write_toml(
        &dir,
        r#"
[server]
port = 8080

[storage]
data_dir = "/var/lib/sprout"
"#,
    );

    let cfg: ApiConfig = load_config_from(Some(&path), env(&[])).unwrap();

    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.storage.data_dir, Path::new("/var/lib/sprout"));
    assert_eq!(cfg.storage.registry_file, Path::new("data/emails.json"));
}

#[test]
fn prefixed_env_overrides_file() {
    let dir = TempDir::new().unwrap();
    let path = write_toml(&dir, "[server]\nport = 8080\n");

    let cfg: ApiConfig = load_config_from(
        Some(&path),
        env(&[("SPROUT__SERVER__PORT", "9000"), ("SPROUT__STORAGE__REGISTRY_FILE", "list.json")]),
    )
    .unwrap();

    assert_eq!(cfg.server.port, 9000);
    assert_eq!(cfg.storage.registry_file, Path::new("list.json"));
}

#[test]
fn bare_port_wins_over_everything() {
    let dir = TempDir::new().unwrap();
    let path = write_toml(&dir, "[server]\nport = 8080\n");

    let cfg: ApiConfig =
        load_config_from(Some(&path), env(&[("SPROUT__SERVER__PORT", "9000"), ("PORT", "5050")]))
            .unwrap();

    assert_eq!(cfg.server.port, 5050);
}

#[test]
fn blank_port_is_ignored() {
    let dir = TempDir::new().unwrap();
    let cfg: ApiConfig =
        load_config_from(Some(dir.path().join("absent")), env(&[("PORT", "  ")])).unwrap();

    assert_eq!(cfg.server.port, DEFAULT_PORT);
}

#[test]
fn invalid_port_is_rejected() {
    let dir = TempDir::new().unwrap();
    let err = load_config_from::<ApiConfig>(Some(dir.path().join("absent")), env(&[("PORT", "abc")]))
        .unwrap_err();

    assert!(matches!(err, ConfigError::InvalidPort { .. }));
    assert!(err.to_string().contains("abc"));
}

#[test]
fn out_of_range_port_is_rejected() {
    let dir = TempDir::new().unwrap();
    let result =
        load_config_from::<ApiConfig>(Some(dir.path().join("absent")), env(&[("PORT", "70000")]));

    assert!(matches!(result, Err(ConfigError::InvalidPort { .. })));
}

#[test]
fn malformed_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = write_toml(&dir, "[server\nport = ");

    let result = load_config_from::<ApiConfig>(Some(&path), env(&[]));

    assert!(matches!(result, Err(ConfigError::Config { .. })));
}
