//! Loading game configuration from JSON files on disk.

use std::fs;
use std::path::PathBuf;

use glam::Vec3;
use rollcubes::{ConfigError, EnemyConfig, EnemyType, GameConfig};
use rstest::rstest;

struct TempFile(PathBuf);

impl TempFile {
    fn with_contents(name: &str, contents: &str) -> Self {
        let path = std::env::temp_dir().join(format!("rollcubes-{}-{name}", std::process::id()));
        fs::write(&path, contents).expect("write temp config");
        Self(path)
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        drop(fs::remove_file(&self.0));
    }
}

#[rstest]
fn saved_config_loads_back_validated() {
    let mut config = GameConfig::default();
    config.settings.target_point = Vec3::new(2.0, 0.0, -3.0);
    config.enemies.push(EnemyConfig {
        kind: EnemyType::Zigzag,
        edge_size: 40.0,
        ..EnemyConfig::for_kind(EnemyType::Zigzag)
    });
    let file = TempFile::with_contents(
        "roundtrip.json",
        &serde_json::to_string_pretty(&config).expect("serialise"),
    );

    let loaded = GameConfig::load(&file.0).expect("load");
    assert_eq!(loaded.settings.target_point, Vec3::new(2.0, 0.0, -3.0));
    let zigzag = loaded.enemy(EnemyType::Zigzag).expect("zigzag configured");
    assert!((zigzag.edge_size - 10.0).abs() < f32::EPSILON);
}

#[rstest]
fn malformed_json_is_a_parse_error() {
    let file = TempFile::with_contents("broken.json", "{ \"settings\": [");
    let err = GameConfig::load(&file.0).expect_err("malformed file");
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[rstest]
#[case(r#"{ "settings": { "gravity": 9.81 } }"#)]
#[case(r#"{ "enemies": [{ "kind": "simple", "hit_points": 0 }] }"#)]
fn invalid_values_are_rejected_on_load(#[case] json: &str) {
    let file = TempFile::with_contents("invalid.json", json);
    assert!(GameConfig::load(&file.0).is_err());
}
