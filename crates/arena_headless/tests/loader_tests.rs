//! Data file loading against real files.

use std::fs;
use std::path::PathBuf;

use arena_core::config::Difficulty;
use arena_core::data::BUILTIN_CATALOG;
use arena_core::error::GameError;
use arena_core::math::Fixed;
use arena_headless::loader::{load_catalog, load_settings, settings_or_default, DataLoadError};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_shipped_catalog_loads_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "cards.ron", BUILTIN_CATALOG);

    let catalog = load_catalog(&path).unwrap();
    assert_eq!(catalog.deck().len(), 5);
    assert_eq!(catalog.card("fireball").unwrap().cost(), 4);
}

#[test]
fn test_malformed_catalog_reports_position() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "cards.ron", "CatalogDocument(\n  cards: [\n");

    let err = load_catalog(&path).unwrap_err();
    let DataLoadError::ParseError { source, .. } = &err else {
        panic!("expected a parse error, got {err}");
    };
    assert!(source.position.line >= 2);
}

#[test]
fn test_inconsistent_catalog_lists_every_problem() {
    let dir = TempDir::new().unwrap();
    let broken = BUILTIN_CATALOG
        .replace("cost: 3,\n            health: 1450", "cost: 11,\n            health: 1450")
        .replace(
            r#"deck: ["knight", "archer", "giant", "fireball", "minions"]"#,
            r#"deck: ["knight", "archer", "giant", "fireball", "dragon"]"#,
        );
    let path = write(&dir, "cards.ron", &broken);

    let err = load_catalog(&path).unwrap_err();
    let DataLoadError::Invalid(GameError::ValidationError { errors, .. }) = err else {
        panic!("expected validation errors, got {err}");
    };
    assert!(errors.len() >= 2, "{errors:?}");
}

#[test]
fn test_partial_settings_take_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "settings.ron", "Settings(difficulty: Hard)");

    let settings = load_settings(&path).unwrap();
    assert_eq!(settings.difficulty, Difficulty::Hard);
    assert_eq!(settings.game_speed, Fixed::ONE);
    assert_eq!(settings.action_interval_ms(), 2_000);
}

#[test]
fn test_out_of_range_speed_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "settings.ron", "Settings(game_speed: 3.0)");

    let err = load_settings(&path).unwrap_err();
    assert!(matches!(
        err,
        DataLoadError::Invalid(GameError::ValidationError { .. })
    ));
}

#[test]
fn test_explicit_settings_path_must_exist() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.ron");
    let err = settings_or_default(Some(&missing)).unwrap_err();
    assert!(matches!(err, DataLoadError::IoError { .. }));
}
