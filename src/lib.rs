//! Советы по локальной памяти OpenCL-устройств.
//!
//! Топология платформ и устройств берётся из снимка `EnvInfo.json`, который
//! печатает C-зонд. Для каждого устройства считается, сколько значений `f32`
//! и какая наибольшая квадратная матрица помещаются в его локальную память.

pub mod advisor;
pub mod error;
pub mod models;
pub mod snapshot;
pub mod utils;

pub use advisor::{advise, write_report, DeviceReport};
pub use error::{AdviseError, Result};
pub use models::{Device, Platform, Settings, Topology};
pub use snapshot::{CachedSnapshot, OpenClProbe, Probe, ProbingSnapshot, SnapshotProvider};
