use amod_routing::{Time, routing::LeastCostPathCalculator, zones::ZoneId};
use fxhash::FxHashMap;
use tracing::debug;

use crate::{
    error::SchedulingError,
    selector::select_route::SelectRoute,
    vehicle::{Fleet, Vehicle},
};

use super::rebalancer::Rebalancer;

impl<R: LeastCostPathCalculator> Rebalancer<'_, R> {
    /// Sends every idle vehicle to a target zone from the queue of its zone, toward the zone's
    /// representative node. Returns the number of vehicles sent.
    pub fn legacy_rebalance_vehicles(
        &mut self,
        fleet: &mut Fleet,
        targets: &mut FxHashMap<ZoneId, Vec<ZoneId>>,
        rng: &mut impl rand::Rng,
        now: Time,
    ) -> Result<usize, SchedulingError> {
        let mut rebalanced = 0;
        for idx in self.idle_vehicles(fleet, now) {
            if self.send_to_target_zone(fleet.get_mut(idx), targets, rng, now)? {
                rebalanced += 1;
            }
        }

        if rebalanced > 0 {
            debug!(rebalanced, "Rebalanced idle vehicles toward target zones");
        }

        Ok(rebalanced)
    }

    fn send_to_target_zone(
        &mut self,
        vehicle: &mut Vehicle,
        targets: &mut FxHashMap<ZoneId, Vec<ZoneId>>,
        rng: &mut impl rand::Rng,
        now: Time,
    ) -> Result<bool, SchedulingError> {
        let node = self.network.link(vehicle.last_link()).to_node();
        let zone = self.network.zone_of(node);

        let Some(queue) = targets.get_mut(&zone) else {
            return Ok(false);
        };
        let Some(index) = self.selector.select_index(queue.len(), rng) else {
            return Ok(false);
        };
        let target = queue[index];

        let Some(representative) = self.network.zones().representative(target) else {
            debug!(%target, "Target zone has no representative node");
            queue.swap_remove(index);
            return Ok(false);
        };

        let route = match self
            .router
            .calc_least_cost_path(self.network, node, representative, now)
        {
            Ok(route) => route,
            Err(err) => {
                debug!(error = %err, %target, "Cannot reach target zone");
                return Ok(false);
            }
        };
        queue.swap_remove(index);

        self.scheduler
            .schedule_rebalance(self.network, vehicle, &route, now)
    }
}

#[cfg(test)]
mod tests {
    use amod_routing::{
        network::NetworkBuilder, routing::Dijkstra, weighting::FreeSpeedWeighting,
    };
    use rand::{SeedableRng, rngs::SmallRng};

    use super::*;
    use crate::{
        params::{AmodParams, RouteSelectionStrategy},
        request::Requests,
        schedule::{scheduler::Scheduler, task::TaskType},
        selector::route_selector::RouteSelector,
    };

    #[test]
    fn test_legacy_rebalance_reaches_representative() {
        let mut builder = NetworkBuilder::default();
        builder.add_node("a", ZoneId::new(1)).unwrap();
        builder.add_node("b", ZoneId::new(1)).unwrap();
        builder.add_node("c", ZoneId::new(2)).unwrap();
        builder.add_node("d", ZoneId::new(2)).unwrap();
        for (from, to) in [("a", "b"), ("b", "c"), ("c", "d"), ("d", "a")] {
            builder
                .add_link(format!("{from}{to}"), from, to, 100.0, 10.0)
                .unwrap();
        }
        builder.set_zone_representative(ZoneId::new(2), "d");
        let network = builder.build().unwrap();

        let mut router = Dijkstra::new(FreeSpeedWeighting);
        let scheduler = Scheduler::new(&AmodParams::default());
        let selector = RouteSelector::from(RouteSelectionStrategy::First);
        let mut rng = SmallRng::seed_from_u64(0);

        let start = network.link_by_id("ab").unwrap();
        let mut fleet = Fleet::new(vec![
            Vehicle::new("v0", start, 0.0, 1000.0),
            Vehicle::new("v1", start, 0.0, 1000.0),
        ]);
        fleet.advance(0.0, &mut Requests::default());

        let mut targets = FxHashMap::default();
        targets.insert(ZoneId::new(1), vec![ZoneId::new(2)]);

        let rebalanced = Rebalancer::new(&network, &mut router, &scheduler, &selector)
            .legacy_rebalance_vehicles(&mut fleet, &mut targets, &mut rng, 0.0)
            .unwrap();

        assert_eq!(rebalanced, 1);
        assert!(targets[&ZoneId::new(1)].is_empty());

        let schedule = fleet.vehicles()[0].schedule();
        assert_eq!(schedule.tasks()[1].task_type(), TaskType::Rebalance);
        assert_eq!(schedule.last_link(), network.link_by_id("cd"));
    }
}
