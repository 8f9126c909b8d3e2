use crate::error::{AdviseError, Result};
use crate::models::settings::{Settings, DEFAULT_SETTINGS_FILE};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::debug;

pub fn save_settings(settings: &Settings, path: &Path) -> Result<()> {
    write_json(settings, path).map_err(|source| AdviseError::Settings {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_settings(path: &Path) -> Result<Settings> {
    read_json(path).map_err(|source| AdviseError::Settings {
        path: path.to_path_buf(),
        source,
    })
}

/// Явно указанный файл обязан читаться; файл по умолчанию необязателен.
pub fn resolve_settings(explicit: Option<&Path>) -> Result<Settings> {
    match explicit {
        Some(path) => load_settings(path),
        None => {
            let default_path = Path::new(DEFAULT_SETTINGS_FILE);
            if default_path.is_file() {
                debug!(path = %default_path.display(), "читаем настройки по умолчанию");
                load_settings(default_path)
            } else {
                Ok(Settings::default())
            }
        }
    }
}

fn write_json(settings: &Settings, path: &Path) -> io::Result<()> {
    let json = serde_json::to_string_pretty(settings)?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

fn read_json(path: &Path) -> io::Result<Settings> {
    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    let settings = serde_json::from_str(&contents)?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn settings_survive_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cl_advisor.json");
        let settings = Settings {
            snapshot_path: PathBuf::from("snapshots/host.json"),
            compiler: "clang".to_string(),
            compiler_flags: vec!["-O2".to_string()],
            keep_probe_binary: true,
        };

        save_settings(&settings, &path).unwrap();
        assert_eq!(load_settings(&path).unwrap(), settings);
    }

    #[test]
    fn broken_settings_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = load_settings(&path).unwrap_err();
        assert!(matches!(err, AdviseError::Settings { .. }));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let err = resolve_settings(Some(&dir.path().join("absent.json"))).unwrap_err();
        assert!(matches!(err, AdviseError::Settings { .. }));
    }
}
