use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use reiter_engine::SattelSettings;
use reiter_logging::{reiter_info, reiter_warn};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] ron::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Settings kept between sessions in a RON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub sattel_program: PathBuf,
    pub sattel_args: Vec<String>,
    pub config_file: Option<PathBuf>,
    pub advance_stride: u32,
    /// RFC 3339 time the last run settled successfully.
    pub last_sync_utc: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        let sattel = SattelSettings::default();
        Self {
            sattel_program: sattel.program,
            sattel_args: sattel.program_args,
            config_file: sattel.config_file,
            advance_stride: sattel.advance_stride,
            last_sync_utc: None,
        }
    }
}

impl AppSettings {
    pub fn sattel_settings(&self) -> SattelSettings {
        SattelSettings {
            program: self.sattel_program.clone(),
            program_args: self.sattel_args.clone(),
            config_file: self.config_file.clone(),
            advance_stride: self.advance_stride,
        }
    }
}

/// Missing or broken files fall back to defaults.
pub fn load_settings(path: &Path) -> AppSettings {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return AppSettings::default(),
        Err(err) => {
            reiter_warn!("Failed to read settings from {:?}: {}", path, err);
            return AppSettings::default();
        }
    };

    match ron::from_str(&content) {
        Ok(settings) => {
            reiter_info!("Loaded settings from {:?}", path);
            settings
        }
        Err(err) => {
            reiter_warn!("Failed to parse settings from {:?}: {}", path, err);
            AppSettings::default()
        }
    }
}

/// Writes through a temp file in the same directory, then renames it over `path`.
pub fn save_settings(path: &Path, settings: &AppSettings) -> Result<(), SettingsError> {
    let content = ron::ser::to_string_pretty(settings, ron::ser::PrettyConfig::new())?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(path).map_err(|e| SettingsError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(&dir.path().join("absent.ron"));
        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.advance_stride, 100);
    }

    #[test]
    fn saved_settings_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.ron");
        let settings = AppSettings {
            sattel_program: PathBuf::from("python3"),
            sattel_args: vec!["-m".into(), "sattel".into()],
            config_file: Some(PathBuf::from("crawlers.toml")),
            advance_stride: 10,
            last_sync_utc: Some("2026-10-19T08:00:00+00:00".into()),
        };

        save_settings(&path, &settings).unwrap();
        save_settings(&path, &settings).unwrap();

        assert_eq!(load_settings(&path), settings);
        assert_eq!(load_settings(&path).sattel_settings().program_args.len(), 2);
    }

    #[test]
    fn partial_and_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        let partial = dir.path().join("partial.ron");
        fs::write(&partial, "(advance_stride: 5)").unwrap();
        let loaded = load_settings(&partial);
        assert_eq!(loaded.advance_stride, 5);
        assert_eq!(loaded.sattel_program, PathBuf::from("sattel"));

        let broken = dir.path().join("broken.ron");
        fs::write(&broken, "not ron at all (").unwrap();
        assert_eq!(load_settings(&broken), AppSettings::default());
    }
}
