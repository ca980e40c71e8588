pub mod error;
pub mod json;
pub mod network;
pub mod path;
pub mod routing;
pub mod timed_path;
pub mod utils;
pub mod weighting;
pub mod zones;

/// Simulation time in seconds.
pub type Time = f64;
pub type Cost = f64;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_network_utils;
