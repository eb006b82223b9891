use std::env;
use std::fs;

use keepsake::config::AppConfig;
use serial_test::serial;

// Clear environment variables that would bleed between tests, including
// the bare names clap reads as flag fallbacks.
fn clear_env_vars() {
    unsafe {
        env::remove_var("KEEPSAKE_SERVER__PORT");
        env::remove_var("KEEPSAKE_SECURITY__JWT_REQUIRED");
        env::remove_var("KEEPSAKE_PERSISTENCE__PROVIDER");
        env::remove_var("KEEPSAKE_RECALL__CLUSTER_RADIUS_KM");
        env::remove_var("CONFIG_FILE");
        env::remove_var("PORT");
        env::remove_var("JWT_REQUIRED");
        env::remove_var("RATE_LIMIT_ENABLED");
        env::remove_var("TIMEOUT_DISABLED");
    }
}

// The test harness's own CLI flags must not reach clap, so every test
// parses an explicit argv instead of env::args().
fn load(args: &[&str]) -> Result<AppConfig, config::ConfigError> {
    AppConfig::load_from_args(args.iter().copied())
}

#[test]
#[serial]
fn test_default_config() {
    clear_env_vars();

    let config = load(&["keepsake"]).expect("defaults should load");
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.server.host, "0.0.0.0");
    assert!(config.security.jwt_required);
    assert!(config.resilience.rate_limit_enabled);
    assert_eq!(config.persistence.provider, "memory");
    assert!((config.recall.cluster_radius_km - 1.0).abs() < f64::EPSILON);
}

#[test]
#[serial]
fn test_env_override() {
    clear_env_vars();
    unsafe {
        env::set_var("KEEPSAKE_SERVER__PORT", "9090");
        env::set_var("KEEPSAKE_RECALL__CLUSTER_RADIUS_KM", "2.5");
    }

    let config = load(&["keepsake"]).expect("Failed to load config");
    assert_eq!(config.server.port, 9090);
    assert!((config.recall.cluster_radius_km - 2.5).abs() < f64::EPSILON);

    clear_env_vars();
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    clear_env_vars();
    unsafe {
        env::set_var("KEEPSAKE_SERVER__PORT", "9090");
    }

    let config = load(&["keepsake", "--port", "4040"]).expect("Failed to load config");
    assert_eq!(config.server.port, 4040);

    clear_env_vars();
}

#[test]
#[serial]
fn test_cli_toggles() {
    clear_env_vars();

    let config = load(&[
        "keepsake",
        "--jwt-required",
        "false",
        "--rate-limit-enabled",
        "false",
        "--timeout-disabled",
        "true",
    ])
    .expect("Failed to load config");

    assert!(!config.security.jwt_required);
    assert!(!config.resilience.rate_limit_enabled);
    assert!(config.resilience.timeout_disabled);
}

#[test]
#[serial]
fn test_file_load() {
    clear_env_vars();

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let file_path = dir.path().join("settings.yaml");
    fs::write(
        &file_path,
        "server:\n  port: 7070\npersistence:\n  provider: surrealdb\n",
    )
    .expect("Failed to write temp config");

    unsafe {
        env::set_var("CONFIG_FILE", file_path.to_str().unwrap());
    }

    let config = load(&["keepsake"]).expect("Failed to load config from file");
    assert_eq!(config.server.port, 7070);
    assert_eq!(config.persistence.provider, "surrealdb");

    clear_env_vars();
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_env_vars();

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let file_path = dir.path().join("settings.yaml");
    fs::write(&file_path, "server:\n  port: 7070\n").expect("Failed to write temp config");

    unsafe {
        env::set_var("CONFIG_FILE", file_path.to_str().unwrap());
        env::set_var("KEEPSAKE_SERVER__PORT", "9090");
    }

    let config = load(&["keepsake"]).expect("Failed to load config");
    assert_eq!(config.server.port, 9090);

    clear_env_vars();
}

#[test]
#[serial]
fn test_cwd_config_fallback() {
    clear_env_vars();

    let cwd_path = "config.yaml";
    fs::write(cwd_path, "server:\n  port: 6060\n").expect("Failed to write ./config.yaml");

    let config = load(&["keepsake"]);

    // Clean up before asserting so a failure doesn't leave the file behind.
    fs::remove_file(cwd_path).unwrap();

    assert_eq!(config.expect("Failed to load config").server.port, 6060);
}
