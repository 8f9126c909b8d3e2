//! Схема файла снимка и её проверка.
//!
//! Разбор идёт в два шага: serde читает сырые структуры в том виде, в каком
//! их печатает зонд, затем [`parse_topology`] проверяет счётчики и индексы и
//! строит [`Topology`]. До советника доходит только проверенное дерево.

use crate::error::{AdviseError, Result};
use crate::models::topology::{device_key, Device, Platform, Topology, DEVICE_KEY_PREFIX};
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Целое число, которое зонд печатает строкой (`"65536"`). Обычное число
/// JSON тоже принимается.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Count(pub u64);

impl<'de> Deserialize<'de> for Count {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(u64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Ok(Count(n)),
            Repr::Text(text) => text.trim().parse::<u64>().map(Count).map_err(|_| {
                de::Error::custom(format!("ожидалось неотрицательное целое, получено `{}`", text))
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawSnapshot {
    #[serde(rename = "NUM_PLATFORMS")]
    num_platforms: Count,
    #[serde(flatten)]
    platforms: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RawPlatform {
    #[serde(rename = "CL_PLATFORM_NAME")]
    name: String,
    #[serde(rename = "NUM_DEVICES")]
    num_devices: Count,
    #[serde(rename = "CL_PLATFORM_VENDOR")]
    vendor: Option<String>,
    #[serde(rename = "CL_PLATFORM_VERSION")]
    version: Option<String>,
    #[serde(rename = "CL_PLATFORM_PROFILE")]
    profile: Option<String>,
    #[serde(rename = "CL_PLATFORM_EXTENSIONS")]
    extensions: Option<String>,
    // Здесь оказываются DEVICE_<i> и всё, что схема не знает
    #[serde(flatten)]
    rest: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RawDevice {
    #[serde(rename = "CL_DEVICE_NAME")]
    name: String,
    #[serde(rename = "CL_DEVICE_LOCAL_MEM_SIZE")]
    local_mem_size: Count,
    #[serde(rename = "CL_DEVICE_TYPE")]
    device_type: Option<String>,
    #[serde(rename = "CL_DEVICE_VENDOR")]
    vendor: Option<String>,
    #[serde(rename = "CL_DEVICE_VERSION")]
    version: Option<String>,
    #[serde(rename = "CL_DEVICE_OPENCL_C_VERSION")]
    opencl_c_version: Option<String>,
    #[serde(rename = "CL_DEVICE_GLOBAL_MEM_SIZE")]
    global_mem_size: Option<Count>,
    #[serde(rename = "CL_DEVICE_GLOBAL_MEM_CACHE_SIZE")]
    global_mem_cache_size: Option<Count>,
    #[serde(rename = "CL_DEVICE_MAX_CONSTANT_BUFFER_SIZE")]
    max_constant_buffer_size: Option<Count>,
    #[serde(rename = "CL_DEVICE_MAX_WORK_GROUP_SIZE")]
    max_work_group_size: Option<Count>,
    #[serde(rename = "CL_DEVICE_MAX_WORK_ITEM_DIMENSIONS")]
    max_work_item_dimensions: Option<Count>,
}

/// Разбирает текст снимка. `origin` нужен только для сообщений об ошибках.
pub fn parse_topology(text: &str, origin: &Path) -> Result<Topology> {
    let raw: RawSnapshot = serde_json::from_str(text)
        .map_err(|e| AdviseError::malformed(origin, e.to_string()))?;

    let mut platforms = Vec::with_capacity(raw.platforms.len());
    for (id, value) in raw.platforms {
        let raw_platform: RawPlatform = serde_json::from_value(value)
            .map_err(|e| AdviseError::malformed(origin, format!("платформа `{}`: {}", id, e)))?;
        platforms.push(build_platform(id, raw_platform, origin)?);
    }

    if raw.num_platforms.0 != platforms.len() as u64 {
        return Err(AdviseError::malformed(
            origin,
            format!(
                "NUM_PLATFORMS = {}, но в снимке {} платформ",
                raw.num_platforms.0,
                platforms.len()
            ),
        ));
    }

    Ok(Topology {
        platforms,
        captured_at: None,
    })
}

fn build_platform(id: String, raw: RawPlatform, origin: &Path) -> Result<Platform> {
    let mut indexed: BTreeMap<usize, Device> = BTreeMap::new();

    for (key, value) in raw.rest {
        let Some(suffix) = key.strip_prefix(DEVICE_KEY_PREFIX) else {
            debug!(platform = %id, key = %key, "пропускаем неизвестный атрибут платформы");
            continue;
        };
        let index = parse_device_index(suffix)
            .filter(|&i| device_key(i) == key)
            .ok_or_else(|| {
                AdviseError::malformed(
                    origin,
                    format!("платформа `{}`: недопустимый ключ устройства `{}`", id, key),
                )
            })?;
        let raw_device: RawDevice = serde_json::from_value(value).map_err(|e| {
            AdviseError::malformed(origin, format!("платформа `{}`, `{}`: {}", id, key, e))
        })?;
        indexed.insert(index, build_device(index, raw_device));
    }

    for (expected, &index) in indexed.keys().enumerate() {
        if expected != index {
            return Err(AdviseError::malformed(
                origin,
                format!(
                    "платформа `{}`: индексы устройств не непрерывны, нет `{}`",
                    id,
                    device_key(expected)
                ),
            ));
        }
    }

    if raw.num_devices.0 != indexed.len() as u64 {
        return Err(AdviseError::malformed(
            origin,
            format!(
                "платформа `{}`: NUM_DEVICES = {}, но найдено {} устройств",
                id,
                raw.num_devices.0,
                indexed.len()
            ),
        ));
    }

    Ok(Platform {
        id,
        name: raw.name,
        vendor: raw.vendor,
        version: raw.version,
        profile: raw.profile,
        extensions: raw.extensions,
        devices: indexed.into_values().collect(),
    })
}

fn build_device(index: usize, raw: RawDevice) -> Device {
    Device {
        index,
        name: raw.name,
        local_memory_size_bytes: raw.local_mem_size.0,
        device_type: raw.device_type,
        vendor: raw.vendor,
        version: raw.version,
        opencl_c_version: raw.opencl_c_version,
        global_memory_size_bytes: raw.global_mem_size.map(|c| c.0),
        global_memory_cache_size_bytes: raw.global_mem_cache_size.map(|c| c.0),
        max_constant_buffer_size_bytes: raw.max_constant_buffer_size.map(|c| c.0),
        max_work_group_size: raw.max_work_group_size.map(|c| c.0),
        max_work_item_dimensions: raw.max_work_item_dimensions.map(|c| c.0),
    }
}

fn parse_device_index(suffix: &str) -> Option<usize> {
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}
