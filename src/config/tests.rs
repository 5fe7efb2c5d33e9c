use super::load_config;
use super::settings::Settings;
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

/// Run `f` with the working directory switched to a fresh temp dir, so
/// `config/default.*` lookups only see what the test writes.
fn in_temp_dir<T>(f: impl FnOnce(&TempDir) -> T) -> T {
    let tmp = TempDir::new().expect("create tempdir");
    let orig = env::current_dir().expect("current_dir");
    env::set_current_dir(tmp.path()).expect("set current dir");
    let out = f(&tmp);
    env::set_current_dir(orig).expect("restore cwd");
    out
}

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.port, 9000);
    assert_eq!(settings.server.addr(), "127.0.0.1:9000");
    assert_eq!(settings.relay.buffer_capacity, 4);
    assert_eq!(settings.log.level, "info");
}

#[test]
#[serial]
fn test_load_config_without_sources_uses_defaults() {
    let cfg = in_temp_dir(|_| load_config().expect("load_config failed"));
    assert_eq!(cfg.server.port, 9000);
    assert_eq!(cfg.relay.buffer_capacity, 4);
}

#[test]
#[serial]
fn test_load_config_from_file_overrides_defaults() {
    let cfg = in_temp_dir(|_| {
        fs::create_dir_all("config").expect("create config dir");
        let toml = r#"
            [server]
            host = "0.0.0.0"
            port = 9100

            [relay]
            buffer_capacity = 8
        "#;
        fs::write("config/default.toml", toml).expect("write config file");
        load_config().expect("load_config failed")
    });

    assert_eq!(cfg.server.host, "0.0.0.0");
    assert_eq!(cfg.server.port, 9100);
    assert_eq!(cfg.relay.buffer_capacity, 8);
    // Not in the file, so the default survives.
    assert_eq!(cfg.log.level, "info");
}

#[test]
#[serial]
fn test_env_overrides_file() {
    let cfg = temp_env::with_vars(
        [
            ("FRAMERELAY_SERVER__PORT", Some("9200")),
            ("FRAMERELAY_LOG__LEVEL", Some("debug")),
        ],
        || {
            in_temp_dir(|_| {
                fs::create_dir_all("config").expect("create config dir");
                fs::write("config/default.toml", "[server]\nport = 9100\n")
                    .expect("write config file");
                load_config().expect("load_config failed")
            })
        },
    );

    assert_eq!(cfg.server.port, 9200);
    assert_eq!(cfg.log.level, "debug");
}

#[test]
#[serial]
fn test_zero_buffer_capacity_is_rejected() {
    let result = temp_env::with_var("FRAMERELAY_RELAY__BUFFER_CAPACITY", Some("0"), || {
        in_temp_dir(|_| load_config())
    });
    assert!(result.is_err());
}
