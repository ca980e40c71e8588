use amod_routing::{
    Time,
    network::{LinkIdx, Network},
    zones::ZoneId,
};
use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::{
    params::AmodParams,
    request::{RequestQueue, RequestStatus, Requests},
    schedule::scheduler::Scheduler,
    vehicle::Fleet,
};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LinkOccupancy {
    pub link: String,
    pub vehicles: usize,
}

/// Snapshot of the fleet and demand handed to the optimizer at the start of an epoch.
///
/// Per-zone counts are aligned with `zones`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct OptimizerInput {
    pub epoch_start: u64,
    pub horizon: u64,
    pub rebalance_weight: f64,
    pub trip_threshold: f64,
    pub legacy_rebalance: bool,
    pub vehicle_count: usize,
    pub idle_vehicles: usize,
    pub passengers_served: usize,
    pub zones: Vec<ZoneId>,
    /// Vehicles by the zone their schedule ends in.
    pub vehicle_distribution: Vec<usize>,
    /// Requests waiting for a vehicle, by pickup zone.
    pub waiting_passengers: Vec<usize>,
    /// Vehicles currently driving, by the link they are on.
    pub link_occupancy: Vec<LinkOccupancy>,
}

impl OptimizerInput {
    pub fn collect(
        network: &Network,
        fleet: &Fleet,
        requests: &Requests,
        queue: &RequestQueue,
        scheduler: &Scheduler,
        params: &AmodParams,
        now: u64,
    ) -> Self {
        let time = now as Time;
        let zones = network.zones();
        let zone_count = zones.zone_count();

        let mut vehicle_distribution = vec![0; zone_count];
        let mut idle_vehicles = 0;
        let mut occupancy: FxHashMap<LinkIdx, usize> = FxHashMap::default();

        for vehicle in fleet.vehicles().iter().filter(|vehicle| time < vehicle.t1()) {
            let end_node = network.link(vehicle.last_link()).to_node();
            if let Some(position) = zones.zone_position(network.zone_of(end_node)) {
                vehicle_distribution[position] += 1;
            }

            if scheduler.is_idle(vehicle, time) {
                idle_vehicles += 1;
            }

            if let Some(path) = vehicle
                .schedule()
                .current_task()
                .and_then(|task| task.path())
            {
                let link = path.links()[path.link_index_at(time)];
                *occupancy.entry(link).or_default() += 1;
            }
        }

        let mut waiting_passengers = vec![0; zone_count];
        for request in queue.pending() {
            let pickup_node = network.link(requests.get(request).from_link()).from_node();
            if let Some(position) = zones.zone_position(network.zone_of(pickup_node)) {
                waiting_passengers[position] += 1;
            }
        }

        let mut occupancy: Vec<(LinkIdx, usize)> = occupancy.into_iter().collect();
        occupancy.sort_unstable();
        let link_occupancy = occupancy
            .into_iter()
            .map(|(link, vehicles)| LinkOccupancy {
                link: network.link(link).external_id().to_string(),
                vehicles,
            })
            .collect();

        let passengers_served = requests.count_with_status(RequestStatus::Dispatched)
            + requests.count_with_status(RequestStatus::PickedUp);

        OptimizerInput {
            epoch_start: now,
            horizon: params.time_horizon,
            rebalance_weight: params.rebalance_weight,
            trip_threshold: params.trip_threshold,
            legacy_rebalance: params.legacy_rebalance,
            vehicle_count: fleet.len(),
            idle_vehicles,
            passengers_served,
            zones: zones.zones().to_vec(),
            vehicle_distribution,
            waiting_passengers,
            link_occupancy,
        }
    }
}
