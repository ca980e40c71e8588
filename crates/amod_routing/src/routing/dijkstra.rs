use std::{cmp::Ordering, collections::BinaryHeap};

use fxhash::FxHashMap;
use tracing::trace;

use crate::{
    Cost, Time,
    error::RoutingError,
    network::{LinkIdx, Network, NodeIdx},
    path::Path,
    weighting::Weighting,
};

use super::least_cost_path::{InitialNode, LeastCostPathCalculator};

#[derive(Copy, Clone, Debug)]
struct HeapItem {
    node: NodeIdx,
    cost: Cost,
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &HeapItem) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapItem {}

impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &HeapItem) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // Flip cost to make this a min-heap
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

struct NodeData {
    cost: Cost,
    time: Time,
    settled: bool,
    /// Parent node and the link from the parent to this node, `None` for sources.
    parent: Option<(NodeIdx, LinkIdx)>,
}

pub struct Dijkstra<W: Weighting> {
    weighting: W,
    heap: BinaryHeap<HeapItem>,
    data: FxHashMap<NodeIdx, NodeData>,
}

impl<W: Weighting> Dijkstra<W> {
    pub fn new(weighting: W) -> Self {
        Dijkstra {
            weighting,
            heap: BinaryHeap::with_capacity(1024),
            data: FxHashMap::default(),
        }
    }

    fn init(&mut self, sources: &[InitialNode], departure_time: Time) {
        self.heap.clear();
        self.data.clear();

        for source in sources {
            let improves = self
                .data
                .get(&source.node)
                .is_none_or(|data| source.initial_cost < data.cost);
            if !improves {
                continue;
            }

            self.data.insert(
                source.node,
                NodeData {
                    cost: source.initial_cost,
                    time: departure_time + source.initial_time,
                    settled: false,
                    parent: None,
                },
            );
            self.heap.push(HeapItem {
                node: source.node,
                cost: source.initial_cost,
            });
        }
    }

    #[inline(always)]
    fn current_cost(&self, node: NodeIdx) -> Cost {
        self.data.get(&node).map_or(Cost::INFINITY, |data| data.cost)
    }

    #[inline(always)]
    fn is_settled(&self, node: NodeIdx) -> bool {
        self.data.get(&node).is_some_and(|data| data.settled)
    }

    fn search(&mut self, network: &Network, to: NodeIdx) -> bool {
        let mut iterations = 0;

        while let Some(HeapItem { node, cost }) = self.heap.pop() {
            if self.is_settled(node) || cost > self.current_cost(node) {
                continue;
            }

            let Some(node_data) = self.data.get_mut(&node) else {
                continue;
            };
            node_data.settled = true;
            let time = node_data.time;
            iterations += 1;

            if node == to {
                trace!(iterations, "Dijkstra settled target");
                return true;
            }

            for &link_idx in network.out_links(node) {
                let link = network.link(link_idx);
                let adj_node = link.to_node();

                if self.is_settled(adj_node) {
                    continue;
                }

                let link_cost = self.weighting.calc_link_cost(link, time);
                if !link_cost.is_finite() {
                    continue;
                }

                let next_cost = cost + link_cost;
                if next_cost < self.current_cost(adj_node) {
                    let next_time = time + self.weighting.calc_link_travel_time(link, time);
                    self.data.insert(
                        adj_node,
                        NodeData {
                            cost: next_cost,
                            time: next_time,
                            settled: false,
                            parent: Some((node, link_idx)),
                        },
                    );
                    self.heap.push(HeapItem {
                        node: adj_node,
                        cost: next_cost,
                    });
                }
            }
        }

        trace!(iterations, "Dijkstra exhausted the heap");
        false
    }

    fn build_path(&self, to: NodeIdx) -> Path {
        let mut nodes = vec![to];
        let mut links = vec![];

        let mut node = to;
        while let Some((parent, link)) = self.data.get(&node).and_then(|data| data.parent) {
            links.push(link);
            nodes.push(parent);
            node = parent;
        }

        nodes.reverse();
        links.reverse();

        // `node` is now the winning source, its data still holds the initial values.
        let (source_cost, source_time) = self
            .data
            .get(&node)
            .map_or((0.0, 0.0), |data| (data.cost, data.time));
        let (end_cost, end_time) = self
            .data
            .get(&to)
            .map_or((0.0, 0.0), |data| (data.cost, data.time));

        Path::new(nodes, links, end_time - source_time, end_cost - source_cost)
    }

    fn check_node(network: &Network, node: NodeIdx) -> Result<(), RoutingError> {
        if network.contains_node(node) {
            Ok(())
        } else {
            Err(RoutingError::UnknownNode(node))
        }
    }
}

impl<W: Weighting> LeastCostPathCalculator for Dijkstra<W> {
    fn calc_least_cost_path(
        &mut self,
        network: &Network,
        from: NodeIdx,
        to: NodeIdx,
        departure_time: Time,
    ) -> Result<Path, RoutingError> {
        self.calc_least_cost_path_from_sources(
            network,
            &[InitialNode::new(from, 0.0, 0.0)],
            to,
            departure_time,
        )
    }

    fn calc_least_cost_path_from_sources(
        &mut self,
        network: &Network,
        sources: &[InitialNode],
        to: NodeIdx,
        departure_time: Time,
    ) -> Result<Path, RoutingError> {
        let Some(first) = sources.first() else {
            return Err(RoutingError::NoSources);
        };

        Self::check_node(network, to)?;
        for source in sources {
            Self::check_node(network, source.node)?;
        }

        self.init(sources, departure_time);

        if self.search(network, to) {
            Ok(self.build_path(to))
        } else {
            Err(RoutingError::NoPath {
                from: first.node,
                to,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        network::NetworkBuilder,
        test_network_utils::{GridNetwork, LINK_TRAVEL_TIME},
        weighting::FreeSpeedWeighting,
        zones::ZoneId,
    };

    #[test]
    fn test_calc_path() {
        let grid = GridNetwork::new(3, 3);
        let mut dijkstra = Dijkstra::new(FreeSpeedWeighting);

        let path = dijkstra
            .calc_least_cost_path(&grid.network, grid.node(0, 0), grid.node(2, 2), 0.0)
            .unwrap();

        assert_eq!(path.link_count(), 4);
        assert_eq!(path.first_node(), grid.node(0, 0));
        assert_eq!(path.last_node(), grid.node(2, 2));
        assert_eq!(path.travel_time(), 4.0 * LINK_TRAVEL_TIME);
        assert_eq!(path.cost(), 4.0 * LINK_TRAVEL_TIME);
    }

    #[test]
    fn test_calc_path_to_self() {
        let grid = GridNetwork::new(2, 2);
        let mut dijkstra = Dijkstra::new(FreeSpeedWeighting);

        let path = dijkstra
            .calc_least_cost_path(&grid.network, grid.node(1, 1), grid.node(1, 1), 10.0)
            .unwrap();

        assert!(path.is_empty());
        assert_eq!(path.nodes(), &[grid.node(1, 1)]);
    }

    #[test]
    fn test_multi_source_picks_cheapest_total() {
        let grid = GridNetwork::new(1, 5);
        let mut dijkstra = Dijkstra::new(FreeSpeedWeighting);
        let target = grid.node(0, 2);

        // Both sources are two links away, the initial delay decides.
        let sources = [
            InitialNode::new(grid.node(0, 0), 5.0, 5.0),
            InitialNode::new(grid.node(0, 4), 1.0, 1.0),
        ];

        let path = dijkstra
            .calc_least_cost_path_from_sources(&grid.network, &sources, target, 0.0)
            .unwrap();

        assert_eq!(path.first_node(), grid.node(0, 4));
        assert_eq!(path.travel_time(), 2.0 * LINK_TRAVEL_TIME);
        assert_eq!(path.cost(), 2.0 * LINK_TRAVEL_TIME);
    }

    #[test]
    fn test_multi_source_closer_source_wins_despite_delay() {
        let grid = GridNetwork::new(1, 5);
        let mut dijkstra = Dijkstra::new(FreeSpeedWeighting);

        let sources = [
            InitialNode::new(grid.node(0, 0), 0.0, 0.0),
            InitialNode::new(grid.node(0, 3), 5.0, 5.0),
        ];

        let path = dijkstra
            .calc_least_cost_path_from_sources(&grid.network, &sources, grid.node(0, 4), 0.0)
            .unwrap();

        assert_eq!(path.first_node(), grid.node(0, 3));
        assert_eq!(path.link_count(), 1);
    }

    #[test]
    fn test_errors() {
        let mut builder = NetworkBuilder::default();
        builder.add_node("a", ZoneId::new(1)).unwrap();
        builder.add_node("b", ZoneId::new(1)).unwrap();
        let network = builder.build().unwrap();
        let a = network.node_by_id("a").unwrap();
        let b = network.node_by_id("b").unwrap();

        let mut dijkstra = Dijkstra::new(FreeSpeedWeighting);

        assert_eq!(
            dijkstra.calc_least_cost_path(&network, a, b, 0.0),
            Err(RoutingError::NoPath { from: a, to: b })
        );
        assert_eq!(
            dijkstra.calc_least_cost_path_from_sources(&network, &[], b, 0.0),
            Err(RoutingError::NoSources)
        );
        assert_eq!(
            dijkstra.calc_least_cost_path(&network, a, NodeIdx::new(7), 0.0),
            Err(RoutingError::UnknownNode(NodeIdx::new(7)))
        );
    }
}
