use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_SETTINGS_FILE: &str = "cl_advisor.json";
pub const DEFAULT_SNAPSHOT_FILE: &str = "EnvInfo.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub snapshot_path: PathBuf,
    pub compiler: String,
    pub compiler_flags: Vec<String>,
    // Оставлять собранный зонд рядом со снимком
    pub keep_probe_binary: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_FILE),
            // build.rs подставляет компилятор, найденный при сборке
            compiler: option_env!("CL_ADVISOR_BUILD_CC")
                .unwrap_or("gcc")
                .to_string(),
            compiler_flags: vec!["-std=c99".to_string(), "-Wall".to_string()],
            keep_probe_binary: false,
        }
    }
}
