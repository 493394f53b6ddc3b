use hanabi_cli::run;
use serde_json::Value;
use serial_test::serial;

const VARS: [&str; 4] = [
    "HANABI_CONFIG",
    "HANABI_SEED",
    "HANABI_PLAYERS",
    "HANABI_STRATEGY",
];

fn clear_env() {
    for var in VARS {
        unsafe {
            std::env::remove_var(var);
        }
    }
}

fn cfg() -> (i32, Value, String) {
    let mut out: Vec<u8> = Vec::new();
    let mut err: Vec<u8> = Vec::new();
    let code = run(["hanabi", "cfg"], &mut out, &mut err);
    let json = serde_json::from_slice(&out).unwrap_or(Value::Null);
    (code, json, String::from_utf8_lossy(&err).into_owned())
}

#[test]
#[serial]
fn defaults_when_nothing_is_set() {
    clear_env();
    let (code, json, _) = cfg();
    assert_eq!(code, 0);
    assert_eq!(json["players"]["value"].as_u64(), Some(2));
    assert_eq!(json["players"]["source"].as_str(), Some("default"));
    assert_eq!(json["strategy"]["value"].as_str(), Some("oracle"));
    assert!(json["seed"]["value"].is_null());
}

#[test]
#[serial]
fn env_overrides_file() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hanabi.toml");
    std::fs::write(&path, "seed = 456\nplayers = 4\nstrategy = \"random\"\n").unwrap();
    unsafe {
        std::env::set_var("HANABI_CONFIG", &path);
    }

    let (code, json, _) = cfg();
    assert_eq!(code, 0);
    assert_eq!(json["seed"]["value"].as_u64(), Some(456));
    assert_eq!(json["seed"]["source"].as_str(), Some("file"));
    assert_eq!(json["players"]["value"].as_u64(), Some(4));
    assert_eq!(json["strategy"]["source"].as_str(), Some("file"));

    unsafe {
        std::env::set_var("HANABI_SEED", "789");
        std::env::set_var("HANABI_PLAYERS", "5");
    }
    let (code, json, _) = cfg();
    assert_eq!(code, 0);
    assert_eq!(json["seed"]["value"].as_u64(), Some(789));
    assert_eq!(json["seed"]["source"].as_str(), Some("env"));
    assert_eq!(json["players"]["value"].as_u64(), Some(5));
    assert_eq!(json["players"]["source"].as_str(), Some("env"));
    assert_eq!(json["strategy"]["value"].as_str(), Some("random"));
    clear_env();
}

#[test]
#[serial]
fn invalid_values_exit_with_error() {
    clear_env();
    unsafe {
        std::env::set_var("HANABI_PLAYERS", "1");
    }
    let (code, _, err) = cfg();
    assert_eq!(code, 2);
    assert!(err.contains("players must be between 2 and 10"));

    unsafe {
        std::env::set_var("HANABI_PLAYERS", "three");
    }
    let (code, _, err) = cfg();
    assert_eq!(code, 2);
    assert!(err.contains("Invalid players"));
    clear_env();
}

#[test]
#[serial]
fn sim_uses_configured_players_and_strategy() {
    clear_env();
    unsafe {
        std::env::set_var("HANABI_PLAYERS", "4");
        std::env::set_var("HANABI_STRATEGY", "random");
        std::env::set_var("HANABI_SEED", "12");
    }
    let mut out: Vec<u8> = Vec::new();
    let mut err: Vec<u8> = Vec::new();
    let code = run(["hanabi", "sim", "--games", "2"], &mut out, &mut err);
    let out = String::from_utf8_lossy(&out);
    assert_eq!(code, 0);
    assert!(out.contains("players=4 strategy=random seed=12"));
    clear_env();
}
