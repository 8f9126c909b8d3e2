use crate::error::{AdviseError, Result};
use crate::models::Topology;
use crate::snapshot::schema::parse_topology;
use chrono::{DateTime, Local};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

pub fn load_snapshot_from_file(path: &Path) -> Result<Topology> {
    let mut file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => AdviseError::unavailable(path, "файл не найден"),
        _ => AdviseError::unavailable(path, e.to_string()),
    })?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| AdviseError::unavailable(path, e.to_string()))?;

    let mut topology = parse_topology(&contents, path)?;
    topology.captured_at = file
        .metadata()
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Local>::from);

    debug!(
        path = %path.display(),
        platforms = topology.platform_count(),
        devices = topology.device_count(),
        "снимок прочитан"
    );
    Ok(topology)
}

/// Временный файл, в который зонд пишет снимок до проверки.
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}

/// Создаёт файл для вывода зонда вместе с недостающими каталогами.
pub fn create_output(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| AdviseError::io(parent, e))?;
    }
    File::create(path).map_err(|e| AdviseError::io(path, e))
}

pub fn commit_partial(partial: &Path, dest: &Path) -> Result<()> {
    fs::rename(partial, dest).map_err(|e| AdviseError::io(dest, e))
}

pub fn discard_partial(partial: &Path) {
    if let Err(e) = fs::remove_file(partial) {
        if e.kind() != io::ErrorKind::NotFound {
            debug!(path = %partial.display(), error = %e, "не удалось удалить временный снимок");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_unavailable() {
        let dir = tempdir().unwrap();
        let err = load_snapshot_from_file(&dir.path().join("EnvInfo.json")).unwrap_err();
        assert!(matches!(err, AdviseError::SnapshotUnavailable { .. }));
    }

    #[test]
    fn loaded_snapshot_records_capture_time() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("EnvInfo.json");
        fs::write(&path, r#"{ "NUM_PLATFORMS": "0" }"#).unwrap();

        let topology = load_snapshot_from_file(&path).unwrap();
        assert!(topology.is_empty());
        assert!(topology.captured_at.is_some());
    }

    #[test]
    fn partial_is_committed_over_destination() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("nested").join("EnvInfo.json");

        let partial = partial_path(&dest);
        assert_eq!(partial, dir.path().join("nested").join("EnvInfo.json.partial"));
        let mut file = create_output(&partial).unwrap();
        file.write_all(b"{}").unwrap();
        drop(file);

        commit_partial(&partial, &dest).unwrap();
        assert!(!partial.exists());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "{}");
    }

    #[test]
    fn output_under_regular_file_fails() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let err = create_output(&blocker.join("EnvInfo.json")).unwrap_err();
        assert!(matches!(err, AdviseError::Io { .. }));
    }

    #[test]
    fn discarding_absent_partial_is_quiet() {
        let dir = tempdir().unwrap();
        discard_partial(&dir.path().join("never.partial"));
    }
}
