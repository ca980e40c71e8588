pub mod dijkstra;
pub mod least_cost_path;

pub use dijkstra::Dijkstra;
pub use least_cost_path::{InitialNode, LeastCostPathCalculator};
