use dupsweep::config::{Config, ConfigError};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Figment without Env so other tests' variables cannot leak in.
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .extract()
        .unwrap();

    assert_eq!(config, Config::default());
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("dupsweep.toml");
    fs::write(
        &config_path,
        r#"
threads = 8
buffer_size = 1024
prefilter = true
prefilter_bytes = 512
"#,
    )
    .unwrap();

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .extract()
        .unwrap();

    assert_eq!(config.threads, 8);
    assert_eq!(config.buffer_size, 1024);
    assert!(config.prefilter);
    assert_eq!(config.finder_config().prefilter, Some(512));
}

#[test]
fn test_env_overrides_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("dupsweep.toml");
    fs::write(&config_path, "wait_retries = 7\n").unwrap();

    std::env::set_var("DUPSWEEP_WAIT_RETRIES", "9");
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .merge(Env::prefixed("DUPSWEEP_"))
        .extract()
        .unwrap();
    std::env::remove_var("DUPSWEEP_WAIT_RETRIES");

    assert_eq!(config.wait_retries, 9);
}

#[test]
fn test_load_explicit_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("custom.toml");
    fs::write(&config_path, "wait_timeout_secs = 30\n").unwrap();

    let config = Config::load(Some(&config_path)).unwrap();

    assert_eq!(config.wait_timeout_secs, 30);
    assert_eq!(config.finder_config().wait_timeout, Duration::from_secs(30));
}

#[test]
fn test_load_rejects_bad_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("broken.toml");
    fs::write(&config_path, "threads = [1, 2]\n").unwrap();

    let result = Config::load(Some(&config_path));
    assert!(matches!(result, Err(ConfigError::Figment(_))));

    let missing = Config::load(Some(&temp_dir.path().join("absent.toml")));
    assert!(matches!(missing, Err(ConfigError::MissingFile(_))));
}
