//! Card table and settings loading from RON files.
//!
//! The core never touches the filesystem; this module reads the documents,
//! parses them and hands them to the core's validators.

use std::fs;
use std::path::{Path, PathBuf};

use arena_core::config::Settings;
use arena_core::data::{Card, CardCatalog, CatalogDocument};
use arena_core::error::GameError;
use thiserror::Error;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "ARENA_DATA_DIR";

/// Card table file name inside the data directory.
pub const CATALOG_FILE: &str = "cards.ron";

/// Settings file name inside the data directory.
pub const SETTINGS_FILE: &str = "settings.ron";

/// Errors that can occur while loading data files.
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// Failed to read the file.
    #[error("IO error reading '{path}': {source}")]
    IoError {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not a well-formed document.
    #[error("Parse error in '{path}': {source}")]
    ParseError {
        /// File that failed to parse.
        path: PathBuf,
        /// RON error with position.
        #[source]
        source: ron::error::SpannedError,
    },

    /// The document parsed but its contents are rejected.
    #[error(transparent)]
    Invalid(#[from] GameError),
}

fn read(path: &Path) -> Result<String, DataLoadError> {
    fs::read_to_string(path).map_err(|source| DataLoadError::IoError {
        path: path.to_path_buf(),
        source,
    })
}

fn source_name(path: &Path) -> String {
    path.display().to_string()
}

/// Load and validate a card table.
///
/// # Errors
///
/// Returns [`DataLoadError`] if the file cannot be read or parsed, or if
/// the catalog fails validation.
pub fn load_catalog(path: &Path) -> Result<CardCatalog, DataLoadError> {
    let text = read(path)?;
    let document: CatalogDocument =
        ron::from_str(&text).map_err(|source| DataLoadError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(CardCatalog::from_document(&source_name(path), document)?)
}

/// Load and validate a settings record.
///
/// Missing fields take their defaults; out-of-range values are errors.
///
/// # Errors
///
/// Returns [`DataLoadError`] if the file cannot be read or parsed, or if a
/// value is out of range.
pub fn load_settings(path: &Path) -> Result<Settings, DataLoadError> {
    let text = read(path)?;
    let settings: Settings = ron::from_str(&text).map_err(|source| DataLoadError::ParseError {
        path: path.to_path_buf(),
        source,
    })?;

    let errors = settings.validate();
    if !errors.is_empty() {
        return Err(GameError::ValidationError {
            source_name: source_name(path),
            errors,
        }
        .into());
    }

    tracing::info!(
        path = %path.display(),
        difficulty = ?settings.difficulty,
        game_speed = %settings.game_speed,
        "Loaded settings"
    );
    Ok(settings)
}

/// Resolve the default data directory.
///
/// Looks in order at:
/// 1. Environment variable `ARENA_DATA_DIR`
/// 2. `./assets/data/` (repo root)
/// 3. `../../assets/data/` (running from a crate directory)
#[must_use]
pub fn default_data_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        let path = PathBuf::from(dir);
        if path.exists() {
            return Some(path);
        }
    }

    ["assets/data", "../../assets/data"]
        .iter()
        .map(PathBuf::from)
        .find(|path| path.join(CATALOG_FILE).exists())
}

/// Load the catalog from `path`, or the embedded table when none is given.
///
/// # Errors
///
/// Returns [`DataLoadError`] if the given file cannot be loaded.
pub fn catalog_or_builtin(path: Option<&Path>) -> Result<CardCatalog, DataLoadError> {
    match path {
        Some(path) => load_catalog(path),
        None => Ok(CardCatalog::builtin()?),
    }
}

/// Load settings from `path`, falling back to the default data directory,
/// then to built-in defaults.
///
/// # Errors
///
/// Returns [`DataLoadError`] if a settings file exists but cannot be loaded.
pub fn settings_or_default(path: Option<&Path>) -> Result<Settings, DataLoadError> {
    if let Some(path) = path {
        return load_settings(path);
    }
    match default_data_dir().map(|dir| dir.join(SETTINGS_FILE)) {
        Some(path) if path.exists() => load_settings(&path),
        _ => {
            tracing::debug!("No settings file found, using defaults");
            Ok(Settings::default())
        }
    }
}

/// One line per card for the `validate` report, in table order.
#[must_use]
pub fn describe_cards(catalog: &CardCatalog) -> Vec<String> {
    catalog
        .cards()
        .iter()
        .map(|card| {
            let kind = match card {
                Card::Troop(_) => "troop",
                Card::Building(_) => "building",
                Card::Spell(_) => "spell",
            };
            format!("{} \"{}\" {kind}, {} elixir", card.id(), card.name(), card.cost())
        })
        .collect()
}
