use amod_routing::{
    Time,
    error::RoutingError,
    network::{LinkIdx, Network},
    path::Path,
    routing::LeastCostPathCalculator,
    timed_path::TimedPath,
};
use tracing::debug;

use super::loop_repair::{check_consistency, remove_loops};

/// A passenger route and whether it follows an optimizer mid-route.
#[derive(Debug, Clone)]
pub struct PayloadRoute {
    pub path: TimedPath,
    pub used_mid_route: bool,
}

/// Builds passenger routes, either straight from the router or along an optimizer mid-route.
pub struct RouteComposer<'a, R: LeastCostPathCalculator> {
    network: &'a Network,
    router: &'a mut R,
}

impl<'a, R: LeastCostPathCalculator> RouteComposer<'a, R> {
    pub fn new(network: &'a Network, router: &'a mut R) -> Self {
        RouteComposer { network, router }
    }

    /// Follows `mid_route` when there is one, falls back to the least cost path when it is
    /// degenerate or cannot be patched.
    pub fn route(
        &mut self,
        mid_route: Option<&Path>,
        from_link: LinkIdx,
        to_link: LinkIdx,
        departure_time: Time,
    ) -> Result<PayloadRoute, RoutingError> {
        if from_link != to_link {
            if let Some(mid_route) = mid_route.filter(|path| !path.is_empty()) {
                match self.compose(mid_route, from_link, to_link, departure_time) {
                    Ok(path) => {
                        return Ok(PayloadRoute {
                            path,
                            used_mid_route: true,
                        });
                    }
                    Err(err) => debug!(error = %err, "Cannot patch mid-route, routing directly"),
                }
            }
        }

        self.direct(from_link, to_link, departure_time)
            .map(|path| PayloadRoute {
                path,
                used_mid_route: false,
            })
    }

    /// The least cost path between the end of `from_link` and the start of `to_link`.
    pub fn direct(
        &mut self,
        from_link: LinkIdx,
        to_link: LinkIdx,
        departure_time: Time,
    ) -> Result<TimedPath, RoutingError> {
        if from_link == to_link {
            return Ok(TimedPath::zero_length(from_link, departure_time));
        }

        let inner = self.router.calc_least_cost_path(
            self.network,
            self.network.link(from_link).to_node(),
            self.network.link(to_link).from_node(),
            departure_time,
        )?;

        Ok(TimedPath::between_links(
            self.network,
            from_link,
            to_link,
            &inner,
            departure_time,
        ))
    }

    /// Patches `mid_route` onto the trip.
    ///
    /// The entry segment joins the trip origin to the first mid-route node outside the origin zone,
    /// the exit segment joins the last mid-route node outside the destination zone to the trip
    /// destination. The mid-route in between is kept as is and loops created by the patching are
    /// cut out.
    pub fn compose(
        &mut self,
        mid_route: &Path,
        from_link: LinkIdx,
        to_link: LinkIdx,
        departure_time: Time,
    ) -> Result<TimedPath, RoutingError> {
        let network = self.network;
        let origin = network.link(from_link).to_node();
        let destination = network.link(to_link).from_node();
        let origin_zone = network.zone_of(origin);
        let destination_zone = network.zone_of(destination);

        let nodes = mid_route.nodes();
        let first_out = nodes
            .iter()
            .position(|&node| network.zone_of(node) != origin_zone);
        let middle_start = first_out.unwrap_or(0);

        let entry =
            self.router
                .calc_least_cost_path(network, origin, nodes[middle_start], departure_time)?;

        let (middle, exit_start) = match nodes
            .iter()
            .rposition(|&node| network.zone_of(node) != destination_zone)
        {
            Some(last_out) => (
                mid_route.links_between(middle_start, last_out),
                nodes[last_out],
            ),
            None => (mid_route.links(), mid_route.last_node()),
        };
        let exit_start = if middle.is_empty() {
            entry.last_node()
        } else {
            exit_start
        };

        let exit_departure =
            departure_time + entry.travel_time() + network.free_travel_time(middle);
        let exit =
            self.router
                .calc_least_cost_path(network, exit_start, destination, exit_departure)?;

        let mut links = Vec::with_capacity(entry.link_count() + middle.len() + exit.link_count() + 2);
        links.push(from_link);
        links.extend_from_slice(entry.links());
        links.extend_from_slice(middle);
        links.extend_from_slice(exit.links());
        links.push(to_link);

        remove_loops(network, &mut links);
        check_consistency(network, &links);

        Ok(TimedPath::from_link_sequence(network, links, departure_time))
    }
}
