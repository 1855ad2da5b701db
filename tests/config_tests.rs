// Configuration layering tests
// Author: kelexine (https://github.com/kelexine)

use circuit_relay::config::AppConfig;
use std::env;
use std::io::Write;

const ENV_VARS: [&str; 4] = [
    "OUTPUT_DIR",
    "CIRCUIT_RELAY__SERVER__PORT",
    "CIRCUIT_RELAY__SERVER__CORS_ORIGINS",
    "CIRCUIT_RELAY__GEMINI__CHAT_MODEL",
];

fn clear_env() {
    for var in ENV_VARS {
        env::remove_var(var);
    }
}

// One test on purpose: the process environment is shared between threads
#[test]
fn test_load_precedence() {
    clear_env();

    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    write!(
        file,
        r#"
[server]
host = "127.0.0.1"
port = 7000

[gemini]
chat_model = "gemini-from-file"
timeout_seconds = 60

[output]
dir = "/tmp/from-file"
"#
    )
    .unwrap();
    file.flush().unwrap();
    let path = file.path().to_string_lossy().to_string();

    // File over defaults
    let config = AppConfig::load(Some(&path)).unwrap();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 7000);
    assert_eq!(config.gemini.chat_model, "gemini-from-file");
    assert_eq!(config.gemini.timeout_seconds, 60);
    assert_eq!(config.gemini.design_model, "gemini-2.5-flash-image-preview");
    assert_eq!(config.output.dir, "/tmp/from-file");
    assert_eq!(config.server.cors_origins.len(), 3);

    // Environment over file, legacy OUTPUT_DIR over everything
    env::set_var("CIRCUIT_RELAY__SERVER__PORT", "9123");
    env::set_var("CIRCUIT_RELAY__SERVER__CORS_ORIGINS", "http://a.test,http://b.test");
    env::set_var("CIRCUIT_RELAY__GEMINI__CHAT_MODEL", "gemini-from-env");
    env::set_var("OUTPUT_DIR", "/tmp/legacy_out");

    let result = AppConfig::load(Some(&path));
    clear_env();
    let config = result.unwrap();

    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 9123);
    assert_eq!(config.server.cors_origins, vec!["http://a.test", "http://b.test"]);
    assert_eq!(config.gemini.chat_model, "gemini-from-env");
    assert_eq!(config.output.dir, "/tmp/legacy_out");

    // An explicit path that does not exist is an error
    assert!(AppConfig::load(Some("/nonexistent/circuit-relay.toml")).is_err());
}
