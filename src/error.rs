use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdviseError>;

#[derive(Error, Debug)]
pub enum AdviseError {
    #[error("Снимок {path} недоступен: {reason}")]
    SnapshotUnavailable { path: PathBuf, reason: String },

    #[error("Снимок {path} повреждён: {reason}")]
    SnapshotMalformed { path: PathBuf, reason: String },

    #[error("Не известно, как собрать и запустить OpenCL-зонд на ОС `{os}`")]
    UnsupportedEnvironment { os: String },

    #[error("Не удалось прочитать настройки {path}: {source}")]
    Settings {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Ошибка ввода-вывода для {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AdviseError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        AdviseError::SnapshotMalformed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unavailable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        AdviseError::SnapshotUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AdviseError::Io {
            path: path.into(),
            source,
        }
    }

    /// Ошибки ввода-вывода при генерации снимка сводятся к `SnapshotUnavailable`.
    pub(crate) fn into_unavailable(self, snapshot: &Path) -> Self {
        match self {
            AdviseError::Io { path, source } => AdviseError::unavailable(
                snapshot,
                format!("{}: {}", path.display(), source),
            ),
            other => other,
        }
    }
}
