//! Integration tests for the kc get/set/has/delete/path commands.

mod common;

use common::TestEnv;
use predicates::prelude::*;
use serde_json::json;

#[test]
fn test_set_then_get() {
    let env = TestEnv::new();

    env.kc()
        .args(["set", "window.width", "1280"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""key":"window.width""#));

    env.kc()
        .args(["get", "window.width"])
        .assert()
        .success()
        .stdout("1280\n");

    env.kc()
        .args(["get", "window"])
        .assert()
        .success()
        .stdout("{\"width\":1280}\n");

    assert_eq!(env.read_config("config.json"), json!({ "window": { "width": 1280 } }));
}

#[test]
fn test_set_plain_string_value() {
    let env = TestEnv::new();

    env.kc().args(["set", "theme", "dark mode"]).assert().success();
    env.kc()
        .args(["get", "theme"])
        .assert()
        .success()
        .stdout("\"dark mode\"\n");
    env.kc()
        .args(["-H", "get", "theme"])
        .assert()
        .success()
        .stdout("dark mode\n");
}

#[test]
fn test_get_missing_key() {
    let env = TestEnv::new();

    env.kc().args(["get", "nothing"]).assert().success().stdout("null\n");
    env.kc()
        .args(["get", "nothing", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing is not set"));
}

#[test]
fn test_get_without_key_merges_defaults() {
    let env = TestEnv::new();
    let defaults = env.write_json("defaults.json", &json!({ "theme": "dark", "size": 1 }));
    let defaults = defaults.to_str().unwrap();

    env.kc()
        .args(["--defaults", defaults, "set", "size", "2"])
        .assert()
        .success();

    env.kc()
        .args(["--defaults", defaults, "get"])
        .assert()
        .success()
        .stdout("{\"theme\":\"dark\",\"size\":2}\n");

    assert_eq!(env.read_config("config.json"), json!({ "size": 2 }));
}

#[test]
fn test_has() {
    let env = TestEnv::new();
    env.kc().args(["set", "a.b", "true"]).assert().success();

    env.kc().args(["has", "a.b"]).assert().success().stdout("true\n");
    env.kc().args(["has", "a.c"]).assert().success().stdout("false\n");
}

#[test]
fn test_delete_key_and_clear() {
    let env = TestEnv::new();
    env.kc().args(["set", "a", "1"]).assert().success();
    env.kc().args(["set", "b", "2"]).assert().success();

    env.kc()
        .args(["-H", "delete", "a"])
        .assert()
        .success()
        .stdout("Deleted a\n");
    assert_eq!(env.read_config("config.json"), json!({ "b": 2 }));

    env.kc()
        .args(["delete"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""remaining":0"#));
    assert_eq!(env.read_config("config.json"), json!({}));
}

#[test]
fn test_flat_mode_keeps_dotted_keys() {
    let env = TestEnv::new();
    env.kc()
        .args(["--flat", "set", "baz.boo", "1"])
        .assert()
        .success();

    assert_eq!(env.read_config("config.json"), json!({ "baz.boo": 1 }));
}

#[test]
fn test_custom_name_and_path() {
    let env = TestEnv::new();
    env.kc()
        .args(["--name", "settings", "-H", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("settings.json"));

    env.kc()
        .args(["--name", "settings", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""exists":false"#));
}

#[test]
fn test_toml_format() {
    let env = TestEnv::new();
    env.kc()
        .args(["--format", "toml", "set", "server.port", "8080"])
        .assert()
        .success();

    let content = std::fs::read_to_string(env.file("config.toml")).unwrap();
    assert!(content.contains("[server]"));
    assert!(content.contains("port = 8080"));
}

#[test]
fn test_schema_violation_is_rejected() {
    let env = TestEnv::new();
    let schema = env.write_json(
        "schema.json",
        &json!({
            "type": "object",
            "properties": { "port": { "type": "integer", "maximum": 65535 } }
        }),
    );
    let schema = schema.to_str().unwrap();

    env.kc()
        .args(["--schema", schema, "set", "port", "8080"])
        .assert()
        .success();

    env.kc()
        .args(["--schema", schema, "set", "port", "70000"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("\"error\""))
        .stderr(predicate::str::contains("does not match JSON schema"));

    env.kc()
        .args(["--schema", schema, "-H", "set", "port", "\"high\""])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error: "));

    assert_eq!(env.read_config("config.json"), json!({ "port": 8080 }));
}

#[test]
fn test_missing_dir_is_an_error() {
    let env = TestEnv::new();
    env.kc()
        .args(["get"])
        .env("KC_CONFIG_DIR", env.file("missing"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_reserved_config_name_is_an_error() {
    let env = TestEnv::new();
    env.kc()
        .args(["--name", "nul", "get"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("reserved"));
}

#[test]
fn test_encrypted_config() {
    let env = TestEnv::new();
    env.kc()
        .args(["--password", "s3cret", "set", "token", "abc"])
        .assert()
        .success();

    assert!(env.file("config").exists());
    assert!(!env.file("config.json").exists());
    let raw = std::fs::read(env.file("config")).unwrap();
    assert!(!String::from_utf8_lossy(&raw).contains("abc"));

    env.kc()
        .args(["get", "token"])
        .env("KC_PASSWORD", "s3cret")
        .assert()
        .success()
        .stdout("\"abc\"\n");

    env.kc()
        .args(["--password", "wrong", "--keep-invalid", "get", "token"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Wrong password"));
    assert!(env.file("config").exists());
}

#[test]
fn test_invalid_file_is_discarded_unless_kept() {
    let env = TestEnv::new();
    std::fs::write(env.file("config.json"), "{ not json").unwrap();

    env.kc()
        .args(["--keep-invalid", "get"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Deserialization failed"));
    assert!(env.file("config.json").exists());

    env.kc().args(["get"]).assert().success().stdout("{}\n");
    assert!(!env.file("config.json").exists());
}
