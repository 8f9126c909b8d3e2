use crate::error::{AdviseError, Result};
use crate::models::Settings;
use crate::utils::file_handler::create_output;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

/// Внешний зонд, который умеет записать снимок топологии в файл.
/// Проверку вывода и перенос на место снимка делает провайдер.
pub trait Probe {
    fn capture(&self, dest: &Path) -> Result<()>;
}

const PROBE_SOURCE: &str = include_str!("../../probe/clinfo_probe.c");
const PROBE_SOURCE_NAME: &str = "clinfo_probe.c";
const PROBE_BINARY_NAME: &str = "clinfo_probe";

/// Флаги, которые зависят от ОС: где лежит cl.h и как линковать OpenCL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostTarget {
    pub defines: Vec<&'static str>,
    pub link: Vec<&'static str>,
}

impl HostTarget {
    pub fn detect(os: &str) -> Result<Self> {
        match os {
            "linux" => Ok(Self {
                defines: vec![],
                link: vec!["-lOpenCL"],
            }),
            "macos" => Ok(Self {
                defines: vec!["-DMAC"],
                link: vec!["-framework", "OpenCL"],
            }),
            other => Err(AdviseError::UnsupportedEnvironment {
                os: other.to_string(),
            }),
        }
    }
}

/// Собирает C-зонд системным компилятором и запускает его.
#[derive(Debug, Clone)]
pub struct OpenClProbe {
    pub compiler: String,
    pub flags: Vec<String>,
    pub keep_binary: bool,
    pub os: String,
}

impl OpenClProbe {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            compiler: settings.compiler.clone(),
            flags: settings.compiler_flags.clone(),
            keep_binary: settings.keep_probe_binary,
            os: std::env::consts::OS.to_string(),
        }
    }

    pub fn compile_command(&self, target: &HostTarget, source: &Path, binary: &Path) -> Command {
        let mut command = Command::new(&self.compiler);
        command
            .args(&self.flags)
            .args(&target.defines)
            .arg(source)
            .arg("-o")
            .arg(binary)
            .args(&target.link);
        command
    }

    fn compile(&self, target: &HostTarget, source: &Path, binary: &Path, dest: &Path) -> Result<()> {
        let mut command = self.compile_command(target, source, binary);
        debug!(?command, "компиляция зонда");

        match command.output() {
            Ok(output) if output.status.success() => {
                info!(compiler = %self.compiler, "зонд скомпилирован успешно");
                Ok(())
            }
            Ok(output) => Err(AdviseError::unavailable(
                dest,
                format!(
                    "ошибка компиляции зонда ({}): {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            )),
            Err(e) => Err(AdviseError::unavailable(
                dest,
                format!("не удалось запустить компилятор `{}`: {}", self.compiler, e),
            )),
        }
    }

    fn run(&self, binary: &Path, dest: &Path) -> Result<()> {
        let file = create_output(dest).map_err(|e| e.into_unavailable(dest))?;

        let outcome = Command::new(binary)
            .stdout(Stdio::from(file))
            .stderr(Stdio::piped())
            .output();

        match outcome {
            Ok(output) if output.status.success() => {
                info!(path = %dest.display(), "зонд отработал");
                Ok(())
            }
            Ok(output) => Err(AdviseError::unavailable(
                dest,
                format!(
                    "зонд завершился с ошибкой ({}): {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            )),
            Err(e) => Err(AdviseError::unavailable(
                dest,
                format!("не удалось запустить зонд: {}", e),
            )),
        }
    }

    fn kept_binary_path(dest: &Path) -> PathBuf {
        dest.with_file_name(PROBE_BINARY_NAME)
    }
}

impl Probe for OpenClProbe {
    fn capture(&self, dest: &Path) -> Result<()> {
        let target = HostTarget::detect(&self.os)?;

        let work_dir = tempfile::Builder::new()
            .prefix("cl_advisor-probe")
            .tempdir()
            .map_err(|e| {
                AdviseError::unavailable(dest, format!("не удалось создать временный каталог: {}", e))
            })?;
        let source = work_dir.path().join(PROBE_SOURCE_NAME);
        let binary = work_dir.path().join(PROBE_BINARY_NAME);
        fs::write(&source, PROBE_SOURCE)
            .map_err(|e| AdviseError::io(&source, e).into_unavailable(dest))?;

        self.compile(&target, &source, &binary, dest)?;
        self.run(&binary, dest)?;

        if self.keep_binary {
            let kept = Self::kept_binary_path(dest);
            match fs::copy(&binary, &kept) {
                Ok(_) => info!(path = %kept.display(), "зонд сохранён"),
                Err(e) => warn!(path = %kept.display(), error = %e, "не удалось сохранить зонд"),
            }
        }
        // work_dir удаляется вместе с бинарником зонда
        Ok(())
    }
}
