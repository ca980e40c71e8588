mod setup;

use amod_dispatch::{
    dispatch::dispatch_finder::DispatchFinder,
    params::{AmodParams, RouteSelectionStrategy},
    rebalance::{rebalancer::Rebalancer, route_pool::RoutePool},
    request::Requests,
    schedule::{scheduler::Scheduler, task::TaskType},
    selector::route_selector::RouteSelector,
    vehicle::{Fleet, Vehicle},
};
use amod_routing::{
    network::LinkIdx,
    path::Path,
    routing::{Dijkstra, LeastCostPathCalculator},
    test_network_utils::GridNetwork,
    timed_path::TimedPath,
    weighting::FreeSpeedWeighting,
};
use fxhash::FxHashMap;
use setup::mock_rng::MockRng;

fn started_fleet(vehicles: Vec<Vehicle>) -> Fleet {
    let mut fleet = Fleet::new(vehicles);
    fleet.advance(0.0, &mut Requests::default());
    fleet
}

#[test]
fn test_dispatch_matches_single_source_searches() {
    let grid = GridNetwork::new(4, 4);
    let network = &grid.network;
    let mut router = Dijkstra::new(FreeSpeedWeighting);
    let params = AmodParams::default();
    let scheduler = Scheduler::new(&params);
    let finder = DispatchFinder::new(&params);

    let vehicle_links = [
        grid.link((0, 0), (0, 1)),
        grid.link((3, 0), (3, 1)),
        grid.link((1, 3), (0, 3)),
        grid.link((2, 1), (1, 1)),
    ];
    let fleet = started_fleet(
        vehicle_links
            .iter()
            .enumerate()
            .map(|(index, &link)| Vehicle::new(format!("v{index}"), link, 0.0, 1000.0))
            .collect(),
    );

    let now = 5.0;
    for index in 0..network.link_count() {
        let pickup_link = LinkIdx::new(index);
        if vehicle_links.contains(&pickup_link) {
            continue;
        }

        let dispatch = finder
            .find_best_vehicle(network, &mut router, &scheduler, &fleet, pickup_link, now)
            .unwrap();

        let best_arrival = vehicle_links
            .iter()
            .map(|&link| {
                let inner = router
                    .calc_least_cost_path(
                        network,
                        network.link(link).to_node(),
                        network.link(pickup_link).from_node(),
                        now,
                    )
                    .unwrap();
                TimedPath::between_links(network, link, pickup_link, &inner, now).arrival_time()
            })
            .fold(f64::INFINITY, f64::min);

        assert_eq!(dispatch.path.arrival_time(), best_arrival);
        assert_eq!(dispatch.path.to_link(), pickup_link);
        assert_eq!(
            dispatch.path.from_link(),
            fleet.get(dispatch.vehicle).last_link()
        );
    }
}

#[test]
fn test_random_selection_hands_out_distinct_routes() {
    let grid = GridNetwork::new(2, 3);
    let network = &grid.network;
    let mut router = Dijkstra::new(FreeSpeedWeighting);
    let scheduler = Scheduler::new(&AmodParams::default());
    let selector = RouteSelector::from(RouteSelectionStrategy::Random);
    let mut rng = MockRng::new(vec![0]);

    let start = grid.link((0, 0), (0, 1));
    let mut fleet = started_fleet(vec![
        Vehicle::new("a", start, 0.0, 1000.0),
        Vehicle::new("b", start, 0.0, 1000.0),
    ]);

    let east = Path::from_nodes(network, &[grid.node(0, 1), grid.node(0, 2), grid.node(1, 2)])
        .unwrap();
    let south = Path::from_nodes(network, &[grid.node(0, 1), grid.node(1, 1), grid.node(1, 0)])
        .unwrap();
    let mut pools = FxHashMap::default();
    pools.insert(
        network.zone_of(grid.node(0, 1)),
        RoutePool::from_iter([east, south]),
    );

    let rebalanced = Rebalancer::new(network, &mut router, &scheduler, &selector)
        .rebalance_vehicles(&mut fleet, &mut pools, &mut rng, 0.0)
        .unwrap();

    assert_eq!(rebalanced, 2);
    assert!(pools.values().all(RoutePool::is_empty));

    let destinations: Vec<_> = fleet
        .vehicles()
        .iter()
        .map(|vehicle| {
            let rebalance = vehicle
                .schedule()
                .tasks()
                .iter()
                .find(|task| task.task_type() == TaskType::Rebalance)
                .unwrap();
            rebalance.path().unwrap().to_link()
        })
        .collect();
    assert_ne!(destinations[0], destinations[1]);
}
