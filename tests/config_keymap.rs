use crossterm::event::{KeyCode, KeyModifiers};
use rollbook::config::Config;
use rollbook::keymap::{Action, KeyBinding, Keymap, KeymapPreset};
use rollbook::styles::ThemeType;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_example_config_loads() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let example_content = r#"
theme = "light"

[firebase]
api_key = "AIza-example"
project_id = "springfield-elementary"
collection = "pupils"
firestore_url = "http://127.0.0.1:8080/v1"

[records]
resync_after_write = false

[keymap]
preset = "vim"

[[keymap.overrides]]
key = "a"
action = "create"

[[keymap.overrides]]
key = "ctrl+h"
action = "help"
"#;
    fs::write(&config_path, example_content).unwrap();

    let config = Config::load_or_create(&config_path).unwrap();

    assert_eq!(config.theme, ThemeType::Light);
    assert!(config.firebase.is_ready());
    assert_eq!(config.firebase.collection, "pupils");
    // Unset keys keep their defaults.
    assert_eq!(config.firebase.database, "(default)");
    assert_eq!(
        config.firebase.auth_url,
        "https://identitytoolkit.googleapis.com/v1"
    );
    assert!(!config.records.resync_after_write);
    assert!(config.require_firebase(&config_path).is_ok());

    let path = config.firebase.collection_path();
    assert_eq!(path.project_id, "springfield-elementary");
    assert_eq!(path.base_url, "http://127.0.0.1:8080/v1");

    assert_eq!(config.keymap.preset, KeymapPreset::Vim);
    assert_eq!(
        config.keymap.get_action(KeyCode::Char('a'), KeyModifiers::NONE),
        Some(Action::Create)
    );
    // 'o' and 'c' were the vim preset's create keys; the override replaces both.
    assert_eq!(
        config.keymap.get_action(KeyCode::Char('o'), KeyModifiers::NONE),
        None
    );
    assert_eq!(
        config.keymap.get_action(KeyCode::Char('c'), KeyModifiers::NONE),
        None
    );
    assert_eq!(
        config.keymap.get_action(KeyCode::Char('h'), KeyModifiers::CONTROL),
        Some(Action::Help)
    );
    assert_eq!(
        config.keymap.get_action(KeyCode::Char('j'), KeyModifiers::NONE),
        Some(Action::MoveDown)
    );
}

#[test]
fn test_keymap_override_survives_save_and_load() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let mut config = Config::default();
    config.keymap.preset = KeymapPreset::Standard;
    config
        .keymap
        .overrides
        .push(KeyBinding::new("x", Action::Quit));
    config
        .keymap
        .overrides
        .push(KeyBinding::new("shift+o", Action::Logout));
    config.save(&config_path).unwrap();

    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[keymap]"));
    assert!(content.contains("preset = \"standard\""));

    let loaded = Config::load_or_create(&config_path).unwrap();
    assert_eq!(loaded, config);

    assert_eq!(
        loaded.keymap.get_action(KeyCode::Char('x'), KeyModifiers::NONE),
        Some(Action::Quit)
    );
    // Both preset quit keys are shadowed.
    assert_eq!(
        loaded.keymap.get_action(KeyCode::Char('q'), KeyModifiers::NONE),
        None
    );
    assert_eq!(
        loaded
            .keymap
            .get_action(KeyCode::Char('c'), KeyModifiers::CONTROL),
        None
    );
    assert_eq!(
        loaded
            .keymap
            .get_action(KeyCode::Char('O'), KeyModifiers::SHIFT),
        Some(Action::Logout)
    );
    assert_eq!(
        loaded
            .keymap
            .get_action(KeyCode::Char('L'), KeyModifiers::SHIFT),
        None
    );
}

#[test]
fn test_hints_follow_overrides() {
    let keymap = Keymap {
        preset: KeymapPreset::Standard,
        overrides: vec![KeyBinding::new("a", Action::Create)],
    };
    assert_eq!(
        keymap.hints(&[(Action::Create, "Add"), (Action::Quit, "Quit")]),
        "A: Add | Q: Quit"
    );
}

#[test]
fn test_invalid_override_is_reported_and_ignored() {
    let keymap = Keymap {
        preset: KeymapPreset::Standard,
        overrides: vec![KeyBinding::new("ctrl+banana", Action::Refresh)],
    };

    let invalid = keymap.invalid_overrides();
    assert_eq!(invalid.len(), 1);
    assert!(invalid[0].starts_with("ctrl+banana"));
    // The broken override still shadows the preset's refresh key.
    assert_eq!(
        keymap.get_action(KeyCode::Char('r'), KeyModifiers::NONE),
        None
    );
}

#[test]
fn test_offline_hint_when_firebase_missing() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    let config = Config::load_or_create(&config_path).unwrap();

    let err = config.require_firebase(&config_path).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("config.toml"));
    assert!(message.contains("--offline"));
}
