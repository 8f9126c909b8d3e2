use chrono::{DateTime, Local};

/// Дерево платформ и устройств, восстановленное из снимка.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Topology {
    pub platforms: Vec<Platform>,
    /// Время изменения файла снимка, если его удалось узнать.
    pub captured_at: Option<DateTime<Local>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Platform {
    pub id: String,
    pub name: String,
    pub vendor: Option<String>,
    pub version: Option<String>,
    pub profile: Option<String>,
    pub extensions: Option<String>,
    pub devices: Vec<Device>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Device {
    pub index: usize,
    pub name: String,
    pub local_memory_size_bytes: u64,
    pub device_type: Option<String>,
    pub vendor: Option<String>,
    pub version: Option<String>,
    pub opencl_c_version: Option<String>,
    pub global_memory_size_bytes: Option<u64>,
    pub global_memory_cache_size_bytes: Option<u64>,
    pub max_constant_buffer_size_bytes: Option<u64>,
    pub max_work_group_size: Option<u64>,
    pub max_work_item_dimensions: Option<u64>,
}

pub const DEVICE_KEY_PREFIX: &str = "DEVICE_";

impl Topology {
    pub fn platform_count(&self) -> usize {
        self.platforms.len()
    }

    pub fn device_count(&self) -> usize {
        self.platforms.iter().map(|p| p.devices.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }
}

impl Platform {
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }
}

impl Device {
    pub fn new(index: usize, name: impl Into<String>, local_memory_size_bytes: u64) -> Self {
        Self {
            index,
            name: name.into(),
            local_memory_size_bytes,
            ..Default::default()
        }
    }

    /// Ключ устройства в снимке: `DEVICE_<index>`.
    pub fn key(&self) -> String {
        device_key(self.index)
    }
}

pub fn device_key(index: usize) -> String {
    format!("{}{}", DEVICE_KEY_PREFIX, index)
}
