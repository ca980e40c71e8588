use amod_routing::{
    Time,
    network::{LinkIdx, Network, NodeIdx},
    routing::{InitialNode, LeastCostPathCalculator},
    timed_path::{FIRST_LINK_TRAVEL_TIME, TimedPath},
};
use fxhash::FxHashMap;
use tracing::{debug, trace};

use crate::{
    params::AmodParams,
    schedule::scheduler::{Departure, Scheduler},
    vehicle::{Fleet, VehicleIdx},
};

/// The vehicle chosen for a pickup and its drive to the pickup link.
#[derive(Debug, Clone)]
pub struct Dispatch {
    pub vehicle: VehicleIdx,
    pub departure: Departure,
    pub path: TimedPath,
}

struct Candidate {
    vehicle: VehicleIdx,
    departure: Departure,
    delay: Time,
}

/// Finds the vehicle that reaches a pickup link first with a single multi-source search.
#[derive(Debug, Clone)]
pub struct DispatchFinder {
    expected_neighbourhood_size: usize,
    zone_pruning: bool,
}

impl DispatchFinder {
    pub fn new(params: &AmodParams) -> Self {
        DispatchFinder {
            expected_neighbourhood_size: params.neighbourhood_size,
            zone_pruning: params.zone_pruning,
        }
    }

    /// Every vehicle that can depart enters the search at the node it leaves from, delayed by the
    /// time until it can leave. Only the earliest vehicle per node is kept.
    pub fn find_best_vehicle<R: LeastCostPathCalculator>(
        &self,
        network: &Network,
        router: &mut R,
        scheduler: &Scheduler,
        fleet: &Fleet,
        pickup_link: LinkIdx,
        now: Time,
    ) -> Option<Dispatch> {
        let link = network.link(pickup_link);
        let target = link.from_node();
        let pickup_zone = network.zone_of(target);

        let mut candidates: FxHashMap<NodeIdx, Candidate> = FxHashMap::with_capacity_and_hasher(
            self.expected_neighbourhood_size,
            Default::default(),
        );

        for (vehicle, state) in fleet.iter_idx() {
            let Some(departure) = scheduler.departure(state, now) else {
                continue;
            };

            let vehicle_node = network.link(departure.link).to_node();
            if self.zone_pruning && network.zone_of(vehicle_node) != pickup_zone {
                continue;
            }

            let mut delay = departure.time - now;
            let node = if departure.link == pickup_link {
                target
            } else {
                delay += FIRST_LINK_TRAVEL_TIME + link.free_travel_time();
                vehicle_node
            };

            let improves = candidates
                .get(&node)
                .is_none_or(|candidate| delay < candidate.delay);
            if improves {
                candidates.insert(
                    node,
                    Candidate {
                        vehicle,
                        departure,
                        delay,
                    },
                );
            }
        }

        if candidates.is_empty() {
            trace!(link = link.external_id(), "No vehicle can reach the pickup");
            return None;
        }

        let sources: Vec<InitialNode> = candidates
            .iter()
            .map(|(&node, candidate)| InitialNode::new(node, candidate.delay, candidate.delay))
            .collect();

        let path = match router.calc_least_cost_path_from_sources(network, &sources, target, now) {
            Ok(path) => path,
            Err(err) => {
                debug!(error = %err, link = link.external_id(), "Dispatch search failed");
                return None;
            }
        };

        let candidate = candidates.get(&path.first_node())?;
        let to_pickup = TimedPath::between_links(
            network,
            candidate.departure.link,
            pickup_link,
            &path,
            candidate.departure.time,
        );

        Some(Dispatch {
            vehicle: candidate.vehicle,
            departure: candidate.departure,
            path: to_pickup,
        })
    }
}

#[cfg(test)]
mod tests {
    use amod_routing::{
        routing::Dijkstra,
        test_network_utils::{GridNetwork, LINK_TRAVEL_TIME},
        weighting::FreeSpeedWeighting,
        zones::ZoneId,
    };

    use super::*;
    use crate::{request::Requests, vehicle::Vehicle};

    fn started_fleet(vehicles: Vec<Vehicle>) -> Fleet {
        let mut fleet = Fleet::new(vehicles);
        fleet.advance(0.0, &mut Requests::default());
        fleet
    }

    #[test]
    fn test_closest_vehicle_wins() {
        let grid = GridNetwork::new(1, 6);
        let network = &grid.network;
        let mut router = Dijkstra::new(FreeSpeedWeighting);
        let params = AmodParams::default();
        let scheduler = Scheduler::new(&params);

        let fleet = started_fleet(vec![
            Vehicle::new("far", grid.link((0, 1), (0, 0)), 0.0, 1000.0),
            Vehicle::new("near", grid.link((0, 2), (0, 3)), 0.0, 1000.0),
        ]);
        let pickup = grid.link((0, 4), (0, 5));

        let dispatch = DispatchFinder::new(&params)
            .find_best_vehicle(network, &mut router, &scheduler, &fleet, pickup, 10.0)
            .unwrap();

        assert_eq!(fleet.get(dispatch.vehicle).id(), "near");
        assert_eq!(dispatch.path.from_link(), grid.link((0, 2), (0, 3)));
        assert_eq!(dispatch.path.to_link(), pickup);
        assert_eq!(dispatch.path.departure_time(), 10.0);
        assert_eq!(
            dispatch.path.arrival_time(),
            10.0 + FIRST_LINK_TRAVEL_TIME + 2.0 * LINK_TRAVEL_TIME
        );
    }

    #[test]
    fn test_vehicle_on_pickup_link() {
        let grid = GridNetwork::new(1, 3);
        let mut router = Dijkstra::new(FreeSpeedWeighting);
        let params = AmodParams::default();
        let scheduler = Scheduler::new(&params);
        let pickup = grid.link((0, 1), (0, 2));

        let fleet = started_fleet(vec![
            Vehicle::new("other", grid.link((0, 0), (0, 1)), 0.0, 1000.0),
            Vehicle::new("there", pickup, 0.0, 1000.0),
        ]);

        let dispatch = DispatchFinder::new(&params)
            .find_best_vehicle(&grid.network, &mut router, &scheduler, &fleet, pickup, 5.0)
            .unwrap();

        assert_eq!(fleet.get(dispatch.vehicle).id(), "there");
        assert_eq!(dispatch.path.links(), &[pickup]);
        assert_eq!(dispatch.path.arrival_time(), 5.0);
    }

    #[test]
    fn test_zone_pruning() {
        let grid = GridNetwork::with_zones(1, 4, |_, col| ZoneId::new(if col < 2 { 1 } else { 2 }));
        let mut router = Dijkstra::new(FreeSpeedWeighting);
        let scheduler = Scheduler::new(&AmodParams::default());
        let fleet = started_fleet(vec![Vehicle::new(
            "v",
            grid.link((0, 1), (0, 0)),
            0.0,
            1000.0,
        )]);
        let pickup = grid.link((0, 2), (0, 3));

        let pruned = AmodParams::default();
        assert!(
            DispatchFinder::new(&pruned)
                .find_best_vehicle(&grid.network, &mut router, &scheduler, &fleet, pickup, 0.0)
                .is_none()
        );

        let unpruned = AmodParams {
            zone_pruning: false,
            ..AmodParams::default()
        };
        assert!(
            DispatchFinder::new(&unpruned)
                .find_best_vehicle(&grid.network, &mut router, &scheduler, &fleet, pickup, 0.0)
                .is_some()
        );
    }

    #[test]
    fn test_no_available_vehicle() {
        let grid = GridNetwork::new(1, 3);
        let mut router = Dijkstra::new(FreeSpeedWeighting);
        let params = AmodParams::default();
        let scheduler = Scheduler::new(&params);
        let fleet = started_fleet(vec![Vehicle::new(
            "v",
            grid.link((0, 0), (0, 1)),
            0.0,
            100.0,
        )]);

        let dispatch = DispatchFinder::new(&params).find_best_vehicle(
            &grid.network,
            &mut router,
            &scheduler,
            &fleet,
            grid.link((0, 1), (0, 2)),
            100.0,
        );

        assert!(dispatch.is_none());
    }
}
