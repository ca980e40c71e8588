#![allow(dead_code)]

pub mod mock_rng;

use amod_dispatch::{
    controller::AmodController,
    error::{OptimizerError, SchedulingError},
    optimizer::{
        fleet_optimizer::FleetOptimizer,
        input::OptimizerInput,
        output::{OptimizerOutput, OptimizerPlan},
        recorded::{RecordedPlan, RecordedPlanOptimizer},
    },
    params::{AmodParams, RouteSelectionStrategy},
    request::Request,
    vehicle::{Fleet, Vehicle},
};
use amod_routing::{network::LinkIdx, test_network_utils::GridNetwork, zones::ZoneId};

/// Always fails, as an unreachable optimizer service would.
pub struct FailingOptimizer {
    pub calls: usize,
}

impl FleetOptimizer for FailingOptimizer {
    fn optimize(
        &mut self,
        _: &OptimizerInput,
    ) -> Result<Option<OptimizerOutput>, OptimizerError> {
        self.calls += 1;
        Err(OptimizerError::Closed)
    }
}

/// A 1 x `cols` line split in zone 1 for the columns before `border` and zone 2 after.
pub fn create_two_zone_line(cols: usize, border: usize) -> GridNetwork {
    GridNetwork::with_zones(1, cols, |_, col| {
        ZoneId::new(if col < border { 1 } else { 2 })
    })
}

pub fn create_params() -> AmodParams {
    AmodParams {
        route_selection: RouteSelectionStrategy::First,
        ..AmodParams::default()
    }
}

pub fn create_vehicle(id: &str, link: LinkIdx, t1: f64) -> Vehicle {
    Vehicle::new(id, link, 0.0, t1)
}

pub fn routes_plan(passenger_routes: &[&[&str]], rebalance_routes: &[&[&str]]) -> OptimizerOutput {
    let to_ids = |routes: &[&[&str]]| {
        routes
            .iter()
            .map(|route| route.iter().map(|node| node.to_string()).collect())
            .collect()
    };

    OptimizerOutput {
        required_vehicles: 1.0,
        plan: OptimizerPlan::Routes {
            passenger_routes: to_ids(passenger_routes),
            rebalance_routes: to_ids(rebalance_routes),
        },
    }
}

pub fn recorded(plans: Vec<(u64, OptimizerOutput)>) -> RecordedPlanOptimizer {
    RecordedPlanOptimizer::new(
        plans
            .into_iter()
            .map(|(epoch_start, output)| RecordedPlan {
                epoch_start,
                output,
            })
            .collect(),
    )
}

pub fn create_controller<O: FleetOptimizer>(
    grid: &GridNetwork,
    vehicles: Vec<Vehicle>,
    params: AmodParams,
    optimizer: O,
) -> AmodController<O> {
    AmodController::new(grid.network.clone(), Fleet::new(vehicles), params, optimizer).unwrap()
}

/// Runs the simulation clock from `from` to `until` inclusive, submitting each request at its
/// submission time.
pub fn run<O: FleetOptimizer>(
    controller: &mut AmodController<O>,
    requests: &mut Vec<Request>,
    from: u64,
    until: u64,
) -> Result<(), SchedulingError> {
    for now in from..=until {
        let time = now as f64;
        let (due, later): (Vec<Request>, Vec<Request>) = std::mem::take(requests)
            .into_iter()
            .partition(|request| request.submission_time() <= time);
        *requests = later;
        for request in due {
            controller.submit_request(request);
        }

        controller.tick(now)?;
        controller.advance(time);
    }
    Ok(())
}
