use crate::models::{Device, Platform, Topology};
use serde::Serialize;
use std::mem::size_of;

pub const FLOAT_SIZE_BYTES: u64 = size_of::<f32>() as u64;

/// Совет по одному устройству: сколько float и какая квадратная матрица
/// помещаются в его локальную память.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceReport {
    pub platform_id: String,
    pub platform_name: String,
    pub device_index: usize,
    pub device_name: String,
    pub local_bytes: u64,
    pub max_floats: u64,
    pub max_square_side: u64,
    pub max_square_elements: u64,
}

impl DeviceReport {
    pub fn for_device(platform: &Platform, device: &Device) -> Self {
        let local_bytes = device.local_memory_size_bytes;
        let max_floats = local_bytes / FLOAT_SIZE_BYTES;
        let max_square_side = integer_sqrt(max_floats);

        Self {
            platform_id: platform.id.clone(),
            platform_name: platform.name.clone(),
            device_index: device.index,
            device_name: device.name.clone(),
            local_bytes,
            max_floats,
            max_square_side,
            max_square_elements: max_square_side * max_square_side,
        }
    }

    pub fn local_kib(&self) -> u64 {
        self.local_bytes / 1024
    }
}

/// Наибольшая сторона квадратной матрицы float для `bytes` байт памяти.
pub fn max_square_side(bytes: u64) -> u64 {
    integer_sqrt(bytes / FLOAT_SIZE_BYTES)
}

/// Наибольшее `n` с `n * n <= value`.
pub fn integer_sqrt(value: u64) -> u64 {
    // f64 даёт приближение, точный ответ доводим целочисленно
    let mut root = (value as f64).sqrt() as u64;
    while root.checked_mul(root).map_or(true, |sq| sq > value) {
        root -= 1;
    }
    while (root + 1).checked_mul(root + 1).map_or(false, |sq| sq <= value) {
        root += 1;
    }
    root
}

/// Отчёты по всем устройствам: сначала платформы, внутри них устройства,
/// в порядке снимка.
pub fn advise(topology: &Topology) -> impl Iterator<Item = DeviceReport> + '_ {
    topology
        .platforms
        .iter()
        .flat_map(|platform| advise_platform(platform))
}

pub fn advise_platform(platform: &Platform) -> impl Iterator<Item = DeviceReport> + '_ {
    platform
        .devices
        .iter()
        .map(move |device| DeviceReport::for_device(platform, device))
}
