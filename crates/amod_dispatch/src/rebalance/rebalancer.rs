use amod_routing::{
    Time,
    network::{Network, NodeIdx},
    path::Path,
    routing::LeastCostPathCalculator,
    zones::ZoneId,
};
use fxhash::FxHashMap;
use tracing::{debug, trace};

use crate::{
    error::SchedulingError,
    schedule::scheduler::Scheduler,
    selector::{route_selector::RouteSelector, select_route::SelectRoute},
    vehicle::{Fleet, Vehicle, VehicleIdx},
};

use super::route_pool::RoutePool;

/// Sends idle vehicles along routes of the optimizer plan.
pub struct Rebalancer<'a, R: LeastCostPathCalculator> {
    pub(super) network: &'a Network,
    pub(super) router: &'a mut R,
    pub(super) scheduler: &'a Scheduler,
    pub(super) selector: &'a RouteSelector,
}

impl<'a, R: LeastCostPathCalculator> Rebalancer<'a, R> {
    pub fn new(
        network: &'a Network,
        router: &'a mut R,
        scheduler: &'a Scheduler,
        selector: &'a RouteSelector,
    ) -> Self {
        Rebalancer {
            network,
            router,
            scheduler,
            selector,
        }
    }

    pub(super) fn idle_vehicles(&self, fleet: &Fleet, now: Time) -> Vec<VehicleIdx> {
        fleet
            .iter_idx()
            .filter(|(_, vehicle)| self.scheduler.is_idle(vehicle, now))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Gives every idle vehicle a route from the pool of its zone. Returns the number of vehicles
    /// sent.
    pub fn rebalance_vehicles(
        &mut self,
        fleet: &mut Fleet,
        pools: &mut FxHashMap<ZoneId, RoutePool>,
        rng: &mut impl rand::Rng,
        now: Time,
    ) -> Result<usize, SchedulingError> {
        let mut rebalanced = 0;
        for idx in self.idle_vehicles(fleet, now) {
            if self.rebalance_vehicle(fleet.get_mut(idx), pools, rng, now)? {
                rebalanced += 1;
            }
        }

        if rebalanced > 0 {
            debug!(rebalanced, "Rebalanced idle vehicles");
        }

        Ok(rebalanced)
    }

    fn rebalance_vehicle(
        &mut self,
        vehicle: &mut Vehicle,
        pools: &mut FxHashMap<ZoneId, RoutePool>,
        rng: &mut impl rand::Rng,
        now: Time,
    ) -> Result<bool, SchedulingError> {
        let node = self.network.link(vehicle.last_link()).to_node();
        let zone = self.network.zone_of(node);

        let Some(pool) = pools.get_mut(&zone) else {
            return Ok(false);
        };
        let Some(index) = self.selector.select_index(pool.len(), rng) else {
            return Ok(false);
        };
        let Some(route) = pool.get(index) else {
            return Ok(false);
        };

        let Some(patched) = self.patch_route(route, node, now) else {
            return Ok(false);
        };
        pool.take(index);

        trace!(vehicle = vehicle.id(), %zone, links = patched.link_count(), "Rebalance route");
        self.scheduler
            .schedule_rebalance(self.network, vehicle, &patched, now)
    }

    /// The part of `route` after `node` when the route passes through it, otherwise a least cost
    /// path to the start of the route followed by the whole route.
    pub fn patch_route(&mut self, route: &Path, node: NodeIdx, now: Time) -> Option<Path> {
        if let Some(position) = route.position(node) {
            return Some(route.slice_from(self.network, position));
        }

        match self
            .router
            .calc_least_cost_path(self.network, node, route.first_node(), now)
        {
            Ok(mut path) => {
                path.append(route);
                Some(path)
            }
            Err(err) => {
                debug!(error = %err, "Cannot reach rebalance route");
                None
            }
        }
    }
}
