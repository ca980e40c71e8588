use std::{fs::File, io::BufReader, path::PathBuf};

use amod_dispatch::{
    controller::AmodController,
    optimizer::{
        fleet_optimizer::FleetOptimizer, http_client::HttpOptimizerClient,
        optimizer_client::OptimizerClient, recorded::RecordedPlanOptimizer,
    },
    params::AmodParams,
    request::{Request, RequestStatus, Requests},
};
use anyhow::Context;
use clap::Args;
use tracing::{info, warn};

use crate::{parsers, scenario::Scenario};

const OPTIMIZER_URL_VAR: &str = "AMOD_OPTIMIZER_URL";

#[derive(Args)]
pub struct RunArgs {
    /// Scenario with the network, the fleet and the requests
    #[arg(short, long)]
    scenario: PathBuf,

    /// Controller parameters, missing fields keep their default
    #[arg(short, long)]
    params: Option<PathBuf>,

    /// Recorded optimizer plans, replayed instead of calling the optimizer service
    #[arg(long)]
    plans: Option<PathBuf>,

    /// Simulated time to stop at (e.g., "3600", "2h"), defaults to the end of the last operating window
    #[arg(short, long, value_parser = parsers::parse_duration)]
    until: Option<jiff::SignedDuration>,
}

fn load_params(path: Option<&PathBuf>) -> anyhow::Result<AmodParams> {
    let Some(path) = path else {
        return Ok(AmodParams::default());
    };
    let file =
        File::open(path).with_context(|| format!("Cannot open params {}", path.display()))?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

fn create_optimizer(plans: Option<&PathBuf>, params: &AmodParams) -> anyhow::Result<OptimizerClient> {
    if let Some(path) = plans {
        let recorded = RecordedPlanOptimizer::from_path(path)?;
        info!(plans = recorded.len(), "Replaying recorded optimizer plans");
        return Ok(OptimizerClient::Recorded(recorded));
    }

    match std::env::var(OPTIMIZER_URL_VAR) {
        Ok(url) => Ok(OptimizerClient::Http(HttpOptimizerClient::connect(
            url,
            params.optimizer_timeout,
        )?)),
        Err(_) => {
            warn!("{OPTIMIZER_URL_VAR} is not set, running without optimizer");
            Ok(OptimizerClient::Disabled)
        }
    }
}

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let params = load_params(args.params.as_ref())?;
    let scenario = Scenario::from_path(&args.scenario)?;
    let until = match args.until {
        Some(duration) => duration.as_secs() as u64,
        None => scenario.end_time().ceil() as u64,
    };
    let Scenario {
        network,
        fleet,
        requests,
    } = scenario;

    info!(
        nodes = network.node_count(),
        links = network.link_count(),
        vehicles = fleet.len(),
        requests = requests.len(),
        until,
        "Loaded scenario"
    );

    let optimizer = create_optimizer(args.plans.as_ref(), &params)?;
    let mut controller = AmodController::new(network, fleet, params, optimizer)?;

    let result = simulate(&mut controller, requests, until);
    controller.close();
    let summary = result?;

    let statistics = controller.statistics();
    info!(
        served = summary.served,
        in_flight = summary.in_flight,
        dropped = summary.dropped,
        unsubmitted = summary.unsubmitted,
        dispatched = statistics.dispatches,
        mid_route_dispatches = statistics.mid_route_dispatches,
        rebalance_trips = statistics.rebalance_trips,
        rolled_over = statistics.rolled_over,
        waiting_for_retry = controller.queue().retry().len(),
        "Finished simulation"
    );

    Ok(())
}

/// Request outcomes when the clock stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub served: usize,
    /// Dispatched or picked up, but not yet dropped off.
    pub in_flight: usize,
    /// Never got a vehicle.
    pub dropped: usize,
    /// Submitted after the clock stopped.
    pub unsubmitted: usize,
}

impl RunSummary {
    fn collect(requests: &Requests, unsubmitted: usize) -> Self {
        RunSummary {
            served: requests.count_with_status(RequestStatus::Completed),
            in_flight: requests.count_with_status(RequestStatus::Dispatched)
                + requests.count_with_status(RequestStatus::PickedUp),
            dropped: requests.count_with_status(RequestStatus::Unplanned),
            unsubmitted,
        }
    }
}

/// Runs the clock from 0 to `until` inclusive, submitting each request at its submission time.
pub fn simulate<O: FleetOptimizer>(
    controller: &mut AmodController<O>,
    requests: Vec<Request>,
    until: u64,
) -> anyhow::Result<RunSummary> {
    let mut pending = requests.into_iter().peekable();
    (0..=until).try_for_each(|now| {
        let time = now as f64;
        while let Some(request) = pending.next_if(|request| request.submission_time() <= time) {
            controller.submit_request(request);
        }

        controller.tick(now)?;
        controller.advance(time);
        Ok::<_, anyhow::Error>(())
    })?;

    Ok(RunSummary::collect(controller.requests(), pending.count()))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    const SCENARIO: &str = r#"{
        "network": {
            "nodes": [
                { "id": "a", "zone": 1 },
                { "id": "b", "zone": 1 },
                { "id": "c", "zone": 1 }
            ],
            "links": [
                { "id": "ab", "from": "a", "to": "b", "length": 100, "freespeed": 10 },
                { "id": "bc", "from": "b", "to": "c", "length": 100, "freespeed": 10 },
                { "id": "cb", "from": "c", "to": "b", "length": 100, "freespeed": 10 }
            ]
        },
        "vehicles": [{ "id": "v", "start_link": "ab", "t1": 3600 }],
        "requests": [
            { "id": "early", "from_link": "ab", "to_link": "bc", "t0": 100, "submission_time": 40 },
            { "id": "late", "from_link": "bc", "to_link": "cb", "t0": 300 }
        ]
    }"#;

    fn simulate_scenario(until: u64) -> RunSummary {
        let Scenario {
            network,
            fleet,
            requests,
        } = Scenario::from_reader(SCENARIO.as_bytes(), Path::new(".")).unwrap();
        let mut controller = AmodController::new(
            network,
            fleet,
            AmodParams::default(),
            OptimizerClient::Disabled,
        )
        .unwrap();

        simulate(&mut controller, requests, until).unwrap()
    }

    #[test]
    fn test_trip_in_progress_is_not_dropped() {
        let summary = simulate_scenario(50);

        assert_eq!(
            summary,
            RunSummary {
                served: 0,
                in_flight: 1,
                dropped: 0,
                unsubmitted: 1,
            }
        );
    }

    #[test]
    fn test_finished_trips_are_served() {
        let summary = simulate_scenario(3600);

        assert_eq!(summary.served, 2);
        assert_eq!(summary.in_flight, 0);
        assert_eq!(summary.dropped, 0);
        assert_eq!(summary.unsubmitted, 0);
    }
}
