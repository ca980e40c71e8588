use amod_routing::{
    Time,
    network::Network,
    routing::{Dijkstra, LeastCostPathCalculator},
    weighting::FreeSpeedWeighting,
};
use rand::{SeedableRng, rngs::SmallRng};
use tracing::{debug, info, warn};

use crate::{
    composition::route_composer::RouteComposer,
    dispatch::dispatch_finder::DispatchFinder,
    error::{ParamsError, SchedulingError},
    optimizer::{fleet_optimizer::FleetOptimizer, input::OptimizerInput},
    params::AmodParams,
    rebalance::rebalancer::Rebalancer,
    request::{Request, RequestIdx, RequestQueue, RequestStatus, Requests},
    route_tables::{RouteTableBuffer, RouteTables},
    schedule::scheduler::Scheduler,
    selector::{route_selector::RouteSelector, select_route::SelectRoute},
    statistics::FleetStatistics,
    utils::stopwatch::Stopwatch,
    vehicle::Fleet,
};

/// Drives dispatch, rebalancing and the optimizer epochs, one tick per simulated second.
///
/// Everything happens synchronously inside [`AmodController::tick`]. The only blocking call is the
/// optimizer, which is bounded by its own timeout.
pub struct AmodController<O: FleetOptimizer, R: LeastCostPathCalculator = Dijkstra<FreeSpeedWeighting>>
{
    network: Network,
    fleet: Fleet,
    requests: Requests,
    queue: RequestQueue,
    params: AmodParams,
    scheduler: Scheduler,
    dispatch_finder: DispatchFinder,
    router: R,
    tables: RouteTableBuffer,
    optimizer: O,
    selector: RouteSelector,
    rng: SmallRng,
    statistics: FleetStatistics,
}

impl<O: FleetOptimizer> AmodController<O> {
    pub fn new(
        network: Network,
        fleet: Fleet,
        params: AmodParams,
        optimizer: O,
    ) -> Result<Self, ParamsError> {
        Self::with_router(
            network,
            fleet,
            params,
            optimizer,
            Dijkstra::new(FreeSpeedWeighting),
        )
    }
}

impl<O: FleetOptimizer, R: LeastCostPathCalculator> AmodController<O, R> {
    pub fn with_router(
        network: Network,
        fleet: Fleet,
        params: AmodParams,
        optimizer: O,
        router: R,
    ) -> Result<Self, ParamsError> {
        params.validate()?;

        Ok(AmodController {
            scheduler: Scheduler::new(&params),
            dispatch_finder: DispatchFinder::new(&params),
            tables: RouteTableBuffer::new(params.optimizer_delay as Time),
            selector: RouteSelector::from(params.route_selection),
            rng: SmallRng::seed_from_u64(params.seed),
            network,
            fleet,
            requests: Requests::default(),
            queue: RequestQueue::default(),
            params,
            router,
            optimizer,
            statistics: FleetStatistics::default(),
        })
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn requests(&self) -> &Requests {
        &self.requests
    }

    pub fn queue(&self) -> &RequestQueue {
        &self.queue
    }

    pub fn tables(&self) -> &RouteTableBuffer {
        &self.tables
    }

    pub fn statistics(&self) -> &FleetStatistics {
        &self.statistics
    }

    pub fn params(&self) -> &AmodParams {
        &self.params
    }

    /// Queues a new request for dispatch at the next tick.
    pub fn submit_request(&mut self, request: Request) -> RequestIdx {
        let t0 = request.t0();
        let idx = self.requests.add(request);
        self.queue.push(idx, t0);
        idx
    }

    /// Moves every vehicle through the tasks that ended by `now`.
    pub fn advance(&mut self, now: Time) {
        self.fleet.advance(now, &mut self.requests);
    }

    /// Hand-off, decision epoch, retry flush, rebalancing, then dispatch of every queued request.
    ///
    /// Requests that cannot be served now go to the retry set. Errors are broken schedule
    /// invariants and leave the controller in an unspecified state.
    pub fn tick(&mut self, now: u64) -> Result<(), SchedulingError> {
        let time = now as Time;

        if self.tables.hand_off(time) {
            info!(now, "Activated route tables");
        }

        if now % self.params.reoptimization_period == 0 {
            self.run_epoch(now);
        }

        if now % self.params.reschedule_period == 0 {
            let flushed = self.queue.flush_retries(&self.requests);
            if flushed > 0 {
                debug!(now, flushed, "Merged retry set into request queue");
            }
        }

        self.rebalance(time)?;
        self.dispatch_queued(time)
    }

    /// Closes the optimizer connection.
    pub fn close(&mut self) {
        self.optimizer.close();
    }

    fn run_epoch(&mut self, now: u64) {
        let time = now as Time;
        let input = OptimizerInput::collect(
            &self.network,
            &self.fleet,
            &self.requests,
            &self.queue,
            &self.scheduler,
            &self.params,
            now,
        );

        let stopwatch = Stopwatch::start("optimizer");
        let result = self.optimizer.optimize(&input);
        let elapsed = stopwatch.stop();

        let output = match result {
            Ok(Some(output)) => output,
            Ok(None) => {
                debug!(now, "No new optimizer plan, keeping current route tables");
                return;
            }
            Err(err) => {
                warn!(
                    now,
                    %elapsed,
                    error = %err,
                    "Optimizer call failed, keeping current route tables"
                );
                return;
            }
        };

        let tables = RouteTables::from_output(&self.network, output);
        self.statistics.count_vehicles(&self.fleet, time);

        let required_vehicles = tables.required_vehicles();
        let idle = self.statistics.idle;
        let fraction_to_rebalance = if idle > 0 {
            required_vehicles / idle as f64
        } else {
            0.0
        };
        info!(
            now,
            required_vehicles,
            idle,
            fraction_to_rebalance,
            %elapsed,
            "Received optimizer plan"
        );

        self.tables.stage(tables, time);

        if self.params.update_timelines_on_epoch {
            self.fleet.update_timelines(time);
        }

        self.statistics.log(now);
    }

    fn rebalance(&mut self, now: Time) -> Result<(), SchedulingError> {
        let mut rebalancer = Rebalancer::new(
            &self.network,
            &mut self.router,
            &self.scheduler,
            &self.selector,
        );
        let active = self.tables.active_mut();

        let sent = if self.params.legacy_rebalance {
            rebalancer.legacy_rebalance_vehicles(
                &mut self.fleet,
                active.zone_targets_mut(),
                &mut self.rng,
                now,
            )?
        } else {
            rebalancer.rebalance_vehicles(
                &mut self.fleet,
                active.rebalance_pools_mut(),
                &mut self.rng,
                now,
            )?
        };

        self.statistics.rebalance_trips += sent;
        Ok(())
    }

    fn dispatch_queued(&mut self, now: Time) -> Result<(), SchedulingError> {
        let mut deferred = 0;
        while let Some(request) = self.queue.pop() {
            if !self.dispatch_request(request, now)? {
                self.queue.defer(request);
                deferred += 1;
            }
        }

        if deferred > 0 {
            debug!(deferred, "Deferred requests to the retry set");
            self.statistics.rolled_over += deferred;
        }

        Ok(())
    }

    /// Returns `false` when no vehicle can serve the request now.
    fn dispatch_request(&mut self, idx: RequestIdx, now: Time) -> Result<bool, SchedulingError> {
        let request = self.requests.get(idx);
        if request.status() != RequestStatus::Unplanned {
            return Err(SchedulingError::RequestNotUnplanned(idx));
        }
        let from_link = request.from_link();
        let to_link = request.to_link();

        let Some(dispatch) = self.dispatch_finder.find_best_vehicle(
            &self.network,
            &mut self.router,
            &self.scheduler,
            &self.fleet,
            from_link,
            now,
        ) else {
            return Ok(false);
        };

        let pickup_end = self
            .scheduler
            .pickup_end_time(dispatch.path.arrival_time(), request);

        let network = &self.network;
        let origin_zone = network.zone_of(network.link(from_link).to_node());
        let destination_zone = network.zone_of(network.link(to_link).from_node());
        let candidates = self.tables.active().mid_routes(origin_zone, destination_zone);
        let mid_route = self
            .selector
            .select_index(candidates.len(), &mut self.rng)
            .map(|index| &candidates[index]);

        let payload = match RouteComposer::new(network, &mut self.router).route(
            mid_route,
            from_link,
            to_link,
            pickup_end,
        ) {
            Ok(payload) => payload,
            Err(err) => {
                debug!(request = request.id(), error = %err, "Cannot route request");
                return Ok(false);
            }
        };

        let vehicle = self.fleet.get_mut(dispatch.vehicle);
        let request = self.requests.get_mut(idx);
        let pickup_end = self.scheduler.schedule_pickup(
            vehicle,
            idx,
            request,
            &dispatch.departure,
            dispatch.path,
            now,
        )?;
        self.scheduler.schedule_dropoff(
            vehicle,
            idx,
            request,
            payload.path.with_departure(pickup_end),
        );

        debug!(
            request = request.id(),
            vehicle = vehicle.id(),
            pickup_end,
            mid_route = payload.used_mid_route,
            "Dispatched request"
        );

        self.statistics.dispatches += 1;
        if payload.used_mid_route {
            self.statistics.mid_route_dispatches += 1;
        }

        Ok(true)
    }
}
