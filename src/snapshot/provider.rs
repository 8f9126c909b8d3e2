use crate::error::Result;
use crate::models::Topology;
use crate::snapshot::probe::Probe;
use crate::utils::file_handler::{
    commit_partial, discard_partial, load_snapshot_from_file, partial_path,
};
use std::path::PathBuf;
use tracing::{info, warn};

/// Единственная точка, через которую советник получает топологию.
pub trait SnapshotProvider {
    fn load(&self) -> Result<Topology>;
}

/// Только читает существующий снимок.
#[derive(Debug, Clone)]
pub struct CachedSnapshot {
    path: PathBuf,
}

impl CachedSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SnapshotProvider for CachedSnapshot {
    fn load(&self) -> Result<Topology> {
        load_snapshot_from_file(&self.path)
    }
}

/// Генерирует снимок зондом, если его нет (или если попросили обновить),
/// затем читает.
#[derive(Debug, Clone)]
pub struct ProbingSnapshot<P> {
    path: PathBuf,
    probe: P,
    refresh: bool,
}

impl<P: Probe> ProbingSnapshot<P> {
    pub fn new(path: impl Into<PathBuf>, probe: P) -> Self {
        Self {
            path: path.into(),
            probe,
            refresh: false,
        }
    }

    pub fn refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    /// Зонд пишет во временный файл; на место снимка попадает только
    /// вывод, прошедший проверку схемы.
    fn generate(&self) -> Result<()> {
        let partial = partial_path(&self.path);
        let outcome = self
            .probe
            .capture(&partial)
            .and_then(|()| load_snapshot_from_file(&partial))
            .and_then(|_| commit_partial(&partial, &self.path));

        if outcome.is_err() {
            discard_partial(&partial);
        }
        outcome
    }
}

impl<P: Probe> SnapshotProvider for ProbingSnapshot<P> {
    fn load(&self) -> Result<Topology> {
        let exists = self.path.is_file();
        if exists && !self.refresh {
            return load_snapshot_from_file(&self.path);
        }

        if exists {
            info!(path = %self.path.display(), "обновляем снимок");
        } else {
            info!(path = %self.path.display(), "снимок не найден, запускаем зонд");
        }

        if let Err(e) = self.generate() {
            // Ошибка зонда не фатальна, если пригодный снимок всё же есть
            if !self.path.is_file() {
                return Err(e.into_unavailable(&self.path));
            }
            warn!(error = %e, "зонд не отработал, используем имеющийся снимок");
        }

        load_snapshot_from_file(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdviseError;
    use std::cell::Cell;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    const ONE_DEVICE: &str = r#"{
        "NUM_PLATFORMS": "1",
        "PLATFORM_0": {
            "CL_PLATFORM_NAME": "Portable Computing Language",
            "NUM_DEVICES": "1",
            "DEVICE_0": { "CL_DEVICE_NAME": "cpu", "CL_DEVICE_LOCAL_MEM_SIZE": "65536" }
        }
    }"#;

    enum Outcome {
        Write(&'static str),
        Fail,
        FailOnIo,
    }

    struct FakeProbe {
        outcome: Outcome,
        calls: Cell<usize>,
    }

    impl FakeProbe {
        fn new(outcome: Outcome) -> Self {
            Self {
                outcome,
                calls: Cell::new(0),
            }
        }

        fn writing(output: &'static str) -> Self {
            Self::new(Outcome::Write(output))
        }

        fn failing() -> Self {
            Self::new(Outcome::Fail)
        }
    }

    impl Probe for &FakeProbe {
        fn capture(&self, dest: &Path) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            match self.outcome {
                Outcome::Write(text) => fs::write(dest, text).map_err(|e| AdviseError::io(dest, e)),
                Outcome::Fail => Err(AdviseError::unavailable(dest, "зонд упал")),
                Outcome::FailOnIo => Err(AdviseError::io(
                    dest,
                    std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
                )),
            }
        }
    }

    #[test]
    fn cached_snapshot_requires_file() {
        let dir = tempdir().unwrap();
        let err = CachedSnapshot::new(dir.path().join("EnvInfo.json"))
            .load()
            .unwrap_err();
        assert!(matches!(err, AdviseError::SnapshotUnavailable { .. }));
    }

    #[test]
    fn probe_runs_when_snapshot_is_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("EnvInfo.json");
        let probe = FakeProbe::writing(ONE_DEVICE);

        let topology = ProbingSnapshot::new(&path, &probe).load().unwrap();
        assert_eq!(probe.calls.get(), 1);
        assert_eq!(topology.device_count(), 1);
        assert!(path.is_file());
    }

    #[test]
    fn existing_snapshot_skips_probe() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("EnvInfo.json");
        fs::write(&path, ONE_DEVICE).unwrap();
        let probe = FakeProbe::failing();

        let topology = ProbingSnapshot::new(&path, &probe).load().unwrap();
        assert_eq!(probe.calls.get(), 0);
        assert_eq!(topology.platforms[0].name, "Portable Computing Language");
    }

    #[test]
    fn refresh_overwrites_existing_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("EnvInfo.json");
        fs::write(&path, r#"{ "NUM_PLATFORMS": "0" }"#).unwrap();
        let probe = FakeProbe::writing(ONE_DEVICE);

        let topology = ProbingSnapshot::new(&path, &probe)
            .refresh(true)
            .load()
            .unwrap();
        assert_eq!(probe.calls.get(), 1);
        assert_eq!(topology.platform_count(), 1);
    }

    #[test]
    fn failed_refresh_falls_back_to_existing_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("EnvInfo.json");
        fs::write(&path, ONE_DEVICE).unwrap();
        let probe = FakeProbe::failing();

        let topology = ProbingSnapshot::new(&path, &probe)
            .refresh(true)
            .load()
            .unwrap();
        assert_eq!(probe.calls.get(), 1);
        assert_eq!(topology.device_count(), 1);
    }

    #[test]
    fn failed_probe_without_snapshot_is_fatal() {
        let dir = tempdir().unwrap();
        let probe = FakeProbe::failing();

        let err = ProbingSnapshot::new(dir.path().join("EnvInfo.json"), &probe)
            .load()
            .unwrap_err();
        assert!(matches!(err, AdviseError::SnapshotUnavailable { .. }));
    }

    #[test]
    fn malformed_generated_snapshot_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("EnvInfo.json");
        let probe = FakeProbe::writing(r#"{ "NUM_PLATFORMS": "1" }"#);

        let err = ProbingSnapshot::new(&path, &probe).load().unwrap_err();
        assert!(matches!(err, AdviseError::SnapshotMalformed { .. }));
        assert!(!path.exists());
        assert!(!partial_path(&path).exists());
    }

    #[test]
    fn broken_refresh_keeps_good_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("EnvInfo.json");
        fs::write(&path, ONE_DEVICE).unwrap();
        let probe = FakeProbe::writing("half-written\n");

        let topology = ProbingSnapshot::new(&path, &probe)
            .refresh(true)
            .load()
            .unwrap();
        assert_eq!(probe.calls.get(), 1);
        assert_eq!(topology.device_count(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), ONE_DEVICE);
        assert!(!partial_path(&path).exists());
    }

    #[test]
    fn io_failure_without_snapshot_is_unavailable() {
        let dir = tempdir().unwrap();
        let probe = FakeProbe::new(Outcome::FailOnIo);

        let err = ProbingSnapshot::new(dir.path().join("EnvInfo.json"), &probe)
            .load()
            .unwrap_err();
        assert!(matches!(err, AdviseError::SnapshotUnavailable { .. }), "{:?}", err);
    }
}
