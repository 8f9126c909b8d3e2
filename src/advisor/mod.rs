pub mod capacity;
pub mod report;

pub use capacity::{advise, advise_platform, max_square_side, DeviceReport};
pub use report::write_report;
