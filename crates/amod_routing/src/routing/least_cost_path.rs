use crate::{
    Cost, Time,
    error::RoutingError,
    network::{Network, NodeIdx},
    path::Path,
};

/// A source of a multi-source search, entered with a cost and time already spent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitialNode {
    pub node: NodeIdx,
    pub initial_cost: Cost,
    pub initial_time: Time,
}

impl InitialNode {
    pub fn new(node: NodeIdx, initial_cost: Cost, initial_time: Time) -> Self {
        InitialNode {
            node,
            initial_cost,
            initial_time,
        }
    }
}

pub trait LeastCostPathCalculator {
    fn calc_least_cost_path(
        &mut self,
        network: &Network,
        from: NodeIdx,
        to: NodeIdx,
        departure_time: Time,
    ) -> Result<Path, RoutingError>;

    /// Searches from every source at once.
    ///
    /// The returned path starts at the winning source. Its travel time and cost do not include the
    /// source's initial values.
    fn calc_least_cost_path_from_sources(
        &mut self,
        network: &Network,
        sources: &[InitialNode],
        to: NodeIdx,
        departure_time: Time,
    ) -> Result<Path, RoutingError>;
}
