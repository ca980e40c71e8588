use amod_routing::{Time, network::Network, path::Path, zones::ZoneId};
use fxhash::FxHashMap;
use tracing::{debug, warn};

use crate::{
    optimizer::output::{OptimizerOutput, OptimizerPlan},
    rebalance::route_pool::RoutePool,
};

/// Routes of one optimizer plan, decomposed onto the network.
#[derive(Debug, Default, Clone)]
pub struct RouteTables {
    mid_routes: FxHashMap<(ZoneId, ZoneId), Vec<Path>>,
    rebalance_pools: FxHashMap<ZoneId, RoutePool>,
    zone_targets: FxHashMap<ZoneId, Vec<ZoneId>>,
    required_vehicles: f64,
}

impl RouteTables {
    pub fn from_output(network: &Network, output: OptimizerOutput) -> Self {
        let mut tables = RouteTables {
            required_vehicles: output.required_vehicles,
            ..RouteTables::default()
        };

        match output.plan {
            OptimizerPlan::Routes {
                passenger_routes,
                rebalance_routes,
            } => {
                for route in passenger_routes {
                    if let Some(path) = decompose(network, &route) {
                        tables.add_mid_route(network, path);
                    }
                }
                for route in rebalance_routes {
                    if let Some(path) = decompose(network, &route) {
                        tables.add_rebalance_route(network, path);
                    }
                }
            }
            OptimizerPlan::Legacy { rebalance_queue } => {
                for entry in rebalance_queue {
                    tables
                        .zone_targets
                        .entry(entry.zone)
                        .or_default()
                        .extend(entry.targets);
                }
            }
        }

        debug!(
            mid_routes = tables.mid_routes.values().map(Vec::len).sum::<usize>(),
            rebalance_routes = tables.rebalance_route_count(),
            "Decomposed optimizer plan"
        );

        tables
    }

    /// Keyed by the zones of the route's first and last node.
    pub fn add_mid_route(&mut self, network: &Network, path: Path) {
        let key = (
            network.zone_of(path.first_node()),
            network.zone_of(path.last_node()),
        );
        self.mid_routes.entry(key).or_default().push(path);
    }

    /// Keyed by the zone of the route's first node. Routes shorter than two links are dropped.
    pub fn add_rebalance_route(&mut self, network: &Network, path: Path) {
        if path.link_count() < 2 {
            return;
        }
        self.rebalance_pools
            .entry(network.zone_of(path.first_node()))
            .or_default()
            .push(path);
    }

    pub fn mid_routes(&self, from: ZoneId, to: ZoneId) -> &[Path] {
        self.mid_routes
            .get(&(from, to))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn rebalance_pools(&self) -> &FxHashMap<ZoneId, RoutePool> {
        &self.rebalance_pools
    }

    pub fn rebalance_pools_mut(&mut self) -> &mut FxHashMap<ZoneId, RoutePool> {
        &mut self.rebalance_pools
    }

    pub fn rebalance_route_count(&self) -> usize {
        self.rebalance_pools.values().map(RoutePool::len).sum()
    }

    pub fn zone_targets_mut(&mut self) -> &mut FxHashMap<ZoneId, Vec<ZoneId>> {
        &mut self.zone_targets
    }

    pub fn required_vehicles(&self) -> f64 {
        self.required_vehicles
    }
}

/// Turns a sequence of external node ids into a path. Drops it with a warning when a node is
/// unknown or two consecutive nodes are not connected.
fn decompose(network: &Network, node_ids: &[String]) -> Option<Path> {
    let mut nodes = Vec::with_capacity(node_ids.len());
    for id in node_ids {
        match network.node_by_id(id) {
            Some(node) => nodes.push(node),
            None => {
                warn!(node = %id, "Dropping route through unknown node");
                return None;
            }
        }
    }

    let path = Path::from_nodes(network, &nodes);
    if path.is_none() {
        warn!(nodes = node_ids.len(), "Dropping route with unconnected nodes");
    }
    path
}

/// Active tables used for scheduling, and the tables of the last epoch waiting for their
/// hand-off time.
#[derive(Debug)]
pub struct RouteTableBuffer {
    active: RouteTables,
    staged: Option<(RouteTables, Time)>,
    handoff_delay: Time,
}

impl RouteTableBuffer {
    pub fn new(handoff_delay: Time) -> Self {
        RouteTableBuffer {
            active: RouteTables::default(),
            staged: None,
            handoff_delay,
        }
    }

    /// Replaces any staged tables not yet handed off.
    pub fn stage(&mut self, tables: RouteTables, epoch_end: Time) {
        self.staged = Some((tables, epoch_end));
    }

    /// Moves the staged tables into the active slot once `now` reaches their hand-off time.
    pub fn hand_off(&mut self, now: Time) -> bool {
        let ready = self
            .staged
            .as_ref()
            .is_some_and(|(_, epoch_end)| now >= epoch_end + self.handoff_delay);
        if !ready {
            return false;
        }

        if let Some((tables, _)) = self.staged.take() {
            self.active = tables;
        }
        true
    }

    pub fn active(&self) -> &RouteTables {
        &self.active
    }

    pub fn active_mut(&mut self) -> &mut RouteTables {
        &mut self.active
    }

    pub fn has_staged(&self) -> bool {
        self.staged.is_some()
    }
}
