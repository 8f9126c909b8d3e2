pub mod probe;
pub mod provider;
pub mod schema;

pub use probe::{OpenClProbe, Probe};
pub use provider::{CachedSnapshot, ProbingSnapshot, SnapshotProvider};
pub use schema::parse_topology;
