mod common;

use common::Workspace;
use themer::{RecordingHost, ThemeError, ThemeManager};

#[test]
fn test_slug_collision_registers_nothing() {
    let ws = Workspace::new();
    ws.theme("shop-a", r#"{"name": "Shop"}"#, &[]);
    ws.theme("shop-b", r#"{"name": "Shop B", "slug": "shop"}"#, &[]);

    let mut manager = ThemeManager::new(ws.config(), RecordingHost::new());
    let err = manager.scan().unwrap_err();

    let message = err.to_string();
    assert!(matches!(err, ThemeError::SlugCollision { .. }));
    assert!(message.contains("'shop'"));
    assert!(message.contains("'Shop'"));
    assert!(message.contains("'Shop B'"));
    assert_eq!(manager.all().count(), 0);
}

#[test]
fn test_malformed_descriptor_does_not_sabotage_siblings() {
    let ws = Workspace::new();
    ws.theme("broken", "{ not json", &[]);
    ws.theme("fine", r#"{"name": "Fine"}"#, &[]);

    let mut manager = ThemeManager::new(ws.config(), RecordingHost::new());
    let report = manager.scan().unwrap();

    assert_eq!(report.registered.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].directory.ends_with("broken"));
    assert!(manager.find("fine").is_some());
}

#[test]
fn test_cache_round_trip_preserves_records() {
    let ws = Workspace::new();
    ws.theme(
        "base",
        r#"{"name": "Base", "author": "Ada", "tags": ["light"], "extra": {"k": 1}}"#,
        &["resources/views", "lang"],
    );
    ws.theme(
        "dark",
        r#"{"name": "Dark", "parent": "base", "asset_path": "skins/dark", "removable": false}"#,
        &["app/Livewire"],
    );

    let manager = ThemeManager::new(ws.config(), RecordingHost::new());
    assert_eq!(manager.build_cache().unwrap(), 2);

    let mut fresh = ThemeManager::new(ws.config(), RecordingHost::new());
    let scanned = fresh.scan_fresh().unwrap();

    let mut cached = ThemeManager::new(ws.config(), RecordingHost::new());
    let loaded = cached.scan().unwrap();
    assert!(loaded.from_cache);

    let before: Vec<_> = scanned.registered.iter().map(|t| t.as_ref().clone()).collect();
    let after: Vec<_> = cached.all().map(|t| t.as_ref().clone()).collect();
    assert_eq!(before, after);

    let dark = cached.find("dark").unwrap();
    assert_eq!(dark.asset_path(), "skins/dark");
    assert!(dark.has_livewire());
    assert!(!dark.removable());
    assert_eq!(cached.find("base").unwrap().config()["extra"]["k"], 1);
}

#[test]
fn test_cache_is_trusted_until_cleared() {
    let ws = Workspace::new();
    ws.theme("one", r#"{"name": "One"}"#, &[]);

    let mut manager = ThemeManager::new(ws.config(), RecordingHost::new());
    manager.build_cache().unwrap();

    ws.theme("two", r#"{"name": "Two"}"#, &[]);
    assert_eq!(manager.scan().unwrap().registered.len(), 1);

    assert!(manager.clear_cache().unwrap());
    manager.reset();
    let report = manager.scan().unwrap();
    assert!(!report.from_cache);
    assert_eq!(report.registered.len(), 2);
}

#[test]
fn test_corrupt_cache_falls_back_to_scan() {
    let ws = Workspace::new();
    ws.theme("one", r#"{"name": "One"}"#, &[]);
    let config = ws.config();
    std::fs::create_dir_all(config.cache_path.parent().unwrap()).unwrap();
    std::fs::write(&config.cache_path, "garbage").unwrap();

    let mut manager = ThemeManager::new(config, RecordingHost::new());
    let report = manager.scan().unwrap();

    assert!(!report.from_cache);
    assert_eq!(report.registered.len(), 1);
}

#[test]
fn test_disabled_cache_is_ignored() {
    let ws = Workspace::new();
    ws.theme("one", r#"{"name": "One"}"#, &[]);

    let manager = ThemeManager::new(ws.config(), RecordingHost::new());
    manager.build_cache().unwrap();
    ws.theme("two", r#"{"name": "Two"}"#, &[]);

    let mut config = ws.config();
    config.discovery.use_cache = false;
    let mut manager = ThemeManager::new(config, RecordingHost::new());
    assert_eq!(manager.scan().unwrap().registered.len(), 2);
}

#[test]
fn test_loosely_typed_descriptor_is_registered() {
    let ws = Workspace::new();
    ws.theme(
        "shop",
        r#"{"name": "Shop", "version": 2, "tags": "store", "removable": "no"}"#,
        &[],
    );

    let mut manager = ThemeManager::new(ws.config(), RecordingHost::new());
    let report = manager.scan().unwrap();

    assert!(report.skipped.is_empty());
    let shop = manager.find("shop").unwrap();
    assert_eq!(shop.version(), "2");
    assert_eq!(shop.tags(), ["store".to_string()]);
    assert!(shop.removable());
}
