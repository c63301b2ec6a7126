use super::*;

fn raw_defaults() -> RawSettings {
    RawSettings::default()
}

#[test]
fn defaults_resolve_to_documented_values() {
    let settings = Settings::from_raw(raw_defaults()).unwrap();

    assert_eq!(settings.server.addr.to_string(), "127.0.0.1:5000");
    assert_eq!(settings.server.base_url.as_str(), "http://127.0.0.1:5000/");
    assert_eq!(settings.server.graceful_shutdown, Duration::from_secs(30));
    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
    assert_eq!(settings.database.url, "sqlite://breve.db?mode=rwc");
    assert_eq!(settings.database.max_connections.get(), 5);
}

#[test]
fn zero_port_is_rejected() {
    let mut raw = raw_defaults();
    raw.server.port = Some(0);

    let err = Settings::from_raw(raw).unwrap_err();
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "server.port",
            ..
        }
    ));
}

#[test]
fn malformed_base_url_is_rejected() {
    let mut raw = raw_defaults();
    raw.server.base_url = Some("not a url".to_string());

    let err = Settings::from_raw(raw).unwrap_err();
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "server.base_url",
            ..
        }
    ));
}

#[test]
fn unknown_log_level_is_rejected() {
    let mut raw = raw_defaults();
    raw.logging.level = Some("loud".to_string());

    let err = Settings::from_raw(raw).unwrap_err();
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "logging.level",
            ..
        }
    ));
}

#[test]
fn cli_overrides_take_precedence() {
    let overrides = ServeOverrides {
        server_port: Some(8080),
        base_url: Some("https://blog.example.com".to_string()),
        log_level: Some("debug".to_string()),
        log_json: Some(true),
        database_max_connections: Some(2),
        ..ServeOverrides::default()
    };

    let mut raw = raw_defaults();
    raw.server.port = Some(3000);
    raw.apply_overrides(&overrides);

    let settings = Settings::from_raw(raw).unwrap();
    assert_eq!(settings.server.addr.port(), 8080);
    assert_eq!(
        settings.server.base_url.as_str(),
        "https://blog.example.com/"
    );
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert!(matches!(settings.logging.format, LogFormat::Json));
    assert_eq!(settings.database.max_connections.get(), 2);
}

#[test]
fn zero_pool_size_is_rejected() {
    let mut raw = raw_defaults();
    raw.database.max_connections = Some(0);

    let err = Settings::from_raw(raw).unwrap_err();
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "database.max_connections",
            ..
        }
    ));
}
