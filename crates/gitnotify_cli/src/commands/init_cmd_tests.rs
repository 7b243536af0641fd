use super::*;
use config_client::DEFAULT_ENDPOINT;
use tempfile::TempDir;

#[test]
fn test_init_writes_default_settings() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("gitnotify.toml");

    let written = execute(path.to_str()).expect("init should succeed");

    assert_eq!(written, path);
    let loaded = AppConfig::load(&path).expect("Failed to load settings");
    assert_eq!(loaded.service.endpoint, DEFAULT_ENDPOINT);
    assert_eq!(loaded.service.token, None);
}

#[test]
fn test_init_refuses_to_overwrite() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("gitnotify.toml");
    std::fs::write(&path, "[service]\nendpoint = \"https://keep.example.com\"\n").unwrap();

    let result = execute(path.to_str());

    match result {
        Err(Error::Config(msg)) => assert!(msg.contains("already exists")),
        other => panic!("Expected Config error, got {:?}", other),
    }
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("keep.example.com"));
}
