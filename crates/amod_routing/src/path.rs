use crate::{
    Cost, Time,
    network::{LinkIdx, Network, NodeIdx},
};

/// A route through the network: `nodes.len() == links.len() + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    nodes: Vec<NodeIdx>,
    links: Vec<LinkIdx>,
    travel_time: Time,
    cost: Cost,
}

impl Path {
    pub fn new(nodes: Vec<NodeIdx>, links: Vec<LinkIdx>, travel_time: Time, cost: Cost) -> Self {
        debug_assert_eq!(nodes.len(), links.len() + 1);
        Path {
            nodes,
            links,
            travel_time,
            cost,
        }
    }

    /// A path that starts and ends at `node` without traversing anything.
    pub fn empty_at(node: NodeIdx) -> Self {
        Path {
            nodes: vec![node],
            links: vec![],
            travel_time: 0.0,
            cost: 0.0,
        }
    }

    /// Builds a path visiting `nodes` in order, with free-flow timings.
    ///
    /// Returns `None` if the sequence is empty or two consecutive nodes are not connected.
    pub fn from_nodes(network: &Network, nodes: &[NodeIdx]) -> Option<Self> {
        let (&first, _) = nodes.split_first()?;
        if !network.contains_node(first) {
            return None;
        }

        let mut links = Vec::with_capacity(nodes.len().saturating_sub(1));
        for window in nodes.windows(2) {
            if !network.contains_node(window[1]) {
                return None;
            }
            links.push(network.link_between(window[0], window[1])?);
        }

        let travel_time = network.free_travel_time(&links);
        Some(Path {
            nodes: nodes.to_vec(),
            links,
            travel_time,
            cost: travel_time,
        })
    }

    /// Builds a path from `start` following `links`. Returns `None` if the links are not contiguous.
    pub fn from_links(network: &Network, start: NodeIdx, links: Vec<LinkIdx>) -> Option<Self> {
        let mut nodes = Vec::with_capacity(links.len() + 1);
        nodes.push(start);

        for &link in &links {
            let link = network.link(link);
            if nodes.last() != Some(&link.from_node()) {
                return None;
            }
            nodes.push(link.to_node());
        }

        let travel_time = network.free_travel_time(&links);
        Some(Path {
            nodes,
            links,
            travel_time,
            cost: travel_time,
        })
    }

    pub fn nodes(&self) -> &[NodeIdx] {
        &self.nodes
    }

    pub fn links(&self) -> &[LinkIdx] {
        &self.links
    }

    pub fn travel_time(&self) -> Time {
        self.travel_time
    }

    pub fn cost(&self) -> Cost {
        self.cost
    }

    pub fn first_node(&self) -> NodeIdx {
        self.nodes[0]
    }

    pub fn last_node(&self) -> NodeIdx {
        self.nodes[self.nodes.len() - 1]
    }

    /// Whether the path traverses no link at all.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn position(&self, node: NodeIdx) -> Option<usize> {
        self.nodes.iter().position(|&n| n == node)
    }

    /// Links between the node at position `first` and the node at position `last`.
    ///
    /// An inverted range yields no links.
    pub fn links_between(&self, first: usize, last: usize) -> &[LinkIdx] {
        if first >= last || last >= self.nodes.len() {
            return &[];
        }
        &self.links[first..last]
    }

    /// The remainder of the path starting at the node at position `index`.
    pub fn slice_from(&self, network: &Network, index: usize) -> Path {
        if index >= self.nodes.len() {
            return Path::empty_at(self.last_node());
        }

        let links = self.links[index..].to_vec();
        let travel_time = network.free_travel_time(&links);
        Path {
            nodes: self.nodes[index..].to_vec(),
            links,
            travel_time,
            cost: travel_time,
        }
    }

    /// Appends `other`, which must start where this path ends.
    pub fn append(&mut self, other: &Path) {
        debug_assert_eq!(self.last_node(), other.first_node());
        self.nodes.extend_from_slice(&other.nodes[1..]);
        self.links.extend_from_slice(&other.links);
        self.travel_time += other.travel_time;
        self.cost += other.cost;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_network_utils::{GridNetwork, LINK_TRAVEL_TIME};

    #[test]
    fn test_from_nodes() {
        let grid = GridNetwork::new(3, 3);
        let nodes = [grid.node(0, 0), grid.node(0, 1), grid.node(1, 1)];

        let path = Path::from_nodes(&grid.network, &nodes).unwrap();

        assert_eq!(path.link_count(), 2);
        assert_eq!(path.travel_time(), 2.0 * LINK_TRAVEL_TIME);
        assert_eq!(path.first_node(), grid.node(0, 0));
        assert_eq!(path.last_node(), grid.node(1, 1));
    }

    #[test]
    fn test_from_nodes_rejects_gaps() {
        let grid = GridNetwork::new(3, 3);
        let nodes = [grid.node(0, 0), grid.node(2, 2)];

        assert!(Path::from_nodes(&grid.network, &nodes).is_none());
        assert!(Path::from_nodes(&grid.network, &[]).is_none());
    }

    #[test]
    fn test_slice_and_append() {
        let grid = GridNetwork::new(1, 4);
        let nodes: Vec<_> = (0..4).map(|col| grid.node(0, col)).collect();
        let path = Path::from_nodes(&grid.network, &nodes).unwrap();

        let tail = path.slice_from(&grid.network, 2);
        assert_eq!(tail.nodes(), &nodes[2..]);
        assert_eq!(tail.link_count(), 1);

        let mut head = Path::from_nodes(&grid.network, &nodes[..3]).unwrap();
        head.append(&tail);
        assert_eq!(head, path);

        assert_eq!(path.links_between(1, 3), &path.links()[1..3]);
        assert!(path.links_between(3, 1).is_empty());
    }

    #[test]
    fn test_from_links() {
        let grid = GridNetwork::new(1, 3);
        let path = Path::from_nodes(&grid.network, &[grid.node(0, 0), grid.node(0, 1), grid.node(0, 2)])
            .unwrap();

        let rebuilt = Path::from_links(&grid.network, grid.node(0, 0), path.links().to_vec());
        assert_eq!(rebuilt, Some(path.clone()));

        let reversed: Vec<_> = path.links().iter().rev().copied().collect();
        assert!(Path::from_links(&grid.network, grid.node(0, 0), reversed).is_none());
    }
}
