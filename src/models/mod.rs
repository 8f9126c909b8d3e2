pub mod settings;
pub mod topology;

pub use settings::Settings;
pub use topology::{Device, Platform, Topology};
