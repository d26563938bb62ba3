use std::{collections::HashMap, env, time::Duration};

use serial_test::serial;
use trustwork::{
    config::{validate_production_config, AppConfig},
    error::ConfigError,
};

#[derive(Default)]
struct EnvGuard {
    original: HashMap<String, Option<String>>,
}

impl EnvGuard {
    fn set(&mut self, key: &str, value: impl Into<String>) {
        self.original
            .entry(key.to_string())
            .or_insert_with(|| env::var(key).ok());
        env::set_var(key, value.into());
    }

    fn remove(&mut self, key: &str) {
        self.original
            .entry(key.to_string())
            .or_insert_with(|| env::var(key).ok());
        env::remove_var(key);
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in self.original.drain() {
            match value {
                Some(v) => env::set_var(&key, v),
                None => env::remove_var(&key),
            }
        }
    }
}

#[test]
#[serial]
fn defaults_apply_when_nothing_is_set() {
    let mut guard = EnvGuard::default();
    for key in ["BASE_URL", "BIND_ADDR", "BACKEND_TIMEOUT_SECS", "ENVIRONMENT"] {
        guard.remove(key);
    }

    let config = AppConfig::from_env().unwrap();
    assert_eq!(config.base_url, "http://127.0.0.1:8000");
    assert_eq!(config.bind_addr.to_string(), "127.0.0.1:3000");
    assert_eq!(config.backend_timeout, Duration::from_secs(30));
    assert!(!config.is_production());
    assert!(validate_production_config(&config).is_ok());
}

#[test]
#[serial]
fn values_are_read_from_the_environment() {
    let mut guard = EnvGuard::default();
    guard.set("BASE_URL", "https://api.trustwork.example/");
    guard.set("BIND_ADDR", "0.0.0.0:8080");
    guard.set("BACKEND_TIMEOUT_SECS", "5");
    guard.set("ENVIRONMENT", "production");

    let config = AppConfig::from_env().unwrap();
    assert_eq!(config.base_url, "https://api.trustwork.example");
    assert_eq!(config.bind_addr.port(), 8080);
    assert_eq!(config.backend_timeout, Duration::from_secs(5));
    assert!(config.is_production());
    assert!(validate_production_config(&config).is_ok());
}

#[test]
#[serial]
fn production_refuses_plain_http_backend() {
    let mut guard = EnvGuard::default();
    guard.set("BASE_URL", "http://backend.internal");
    guard.set("ENVIRONMENT", "production");
    guard.remove("BIND_ADDR");
    guard.remove("BACKEND_TIMEOUT_SECS");

    let config = AppConfig::from_env().unwrap();
    assert!(matches!(
        validate_production_config(&config),
        Err(ConfigError::InsecureBackend(url)) if url == "http://backend.internal"
    ));
}

#[test]
#[serial]
fn malformed_values_are_rejected() {
    let mut guard = EnvGuard::default();
    guard.remove("BASE_URL");
    guard.set("BIND_ADDR", "not-an-address");

    assert!(matches!(
        AppConfig::from_env(),
        Err(ConfigError::InvalidValue { key: "BIND_ADDR", .. })
    ));

    guard.set("BIND_ADDR", "127.0.0.1:3000");
    guard.set("BACKEND_TIMEOUT_SECS", "soon");
    assert!(matches!(
        AppConfig::from_env(),
        Err(ConfigError::InvalidValue { key: "BACKEND_TIMEOUT_SECS", .. })
    ));
}
