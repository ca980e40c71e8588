use fxhash::FxHashMap;
use smallvec::SmallVec;

use crate::{
    Time,
    define_index_newtype,
    error::NetworkError,
    zones::{ZoneId, ZoneIndex},
};

define_index_newtype!(NodeIdx, Node);
define_index_newtype!(LinkIdx, Link);

#[derive(Debug, Clone)]
pub struct Node {
    external_id: String,
    out_links: SmallVec<[LinkIdx; 4]>,
}

impl Node {
    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    pub fn out_links(&self) -> &[LinkIdx] {
        &self.out_links
    }
}

/// A directed road segment. Immutable for the whole run.
#[derive(Debug, Clone)]
pub struct Link {
    external_id: String,
    from_node: NodeIdx,
    to_node: NodeIdx,
    /// Meters
    length: f64,
    /// Meters per second
    freespeed: f64,
}

impl Link {
    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    pub fn from_node(&self) -> NodeIdx {
        self.from_node
    }

    pub fn to_node(&self) -> NodeIdx {
        self.to_node
    }

    /// Free-flow travel time, `length / freespeed`.
    #[inline(always)]
    pub fn free_travel_time(&self) -> Time {
        self.length / self.freespeed
    }
}

#[derive(Debug, Clone)]
pub struct Network {
    nodes: Vec<Node>,
    links: Vec<Link>,
    zones: ZoneIndex,
    node_ids: FxHashMap<String, NodeIdx>,
    link_ids: FxHashMap<String, LinkIdx>,
}

impl Network {
    pub fn node(&self, node: NodeIdx) -> &Node {
        &self.nodes[node]
    }

    pub fn link(&self, link: LinkIdx) -> &Link {
        &self.links[link]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn contains_node(&self, node: NodeIdx) -> bool {
        node.get() < self.nodes.len()
    }

    pub fn node_by_id(&self, external_id: &str) -> Option<NodeIdx> {
        self.node_ids.get(external_id).copied()
    }

    pub fn link_by_id(&self, external_id: &str) -> Option<LinkIdx> {
        self.link_ids.get(external_id).copied()
    }

    #[inline(always)]
    pub fn out_links(&self, node: NodeIdx) -> &[LinkIdx] {
        &self.nodes[node].out_links
    }

    /// First link leaving `from` that ends in `to`.
    pub fn link_between(&self, from: NodeIdx, to: NodeIdx) -> Option<LinkIdx> {
        self.out_links(from)
            .iter()
            .copied()
            .find(|&link| self.links[link].to_node == to)
    }

    /// Whether a vehicle can go from `first` straight onto `second`.
    pub fn are_adjacent(&self, first: LinkIdx, second: LinkIdx) -> bool {
        self.links[first].to_node == self.links[second].from_node
    }

    pub fn zones(&self) -> &ZoneIndex {
        &self.zones
    }

    #[inline(always)]
    pub fn zone_of(&self, node: NodeIdx) -> ZoneId {
        self.zones.zone_of(node)
    }

    pub fn free_travel_time(&self, links: &[LinkIdx]) -> Time {
        links
            .iter()
            .map(|&link| self.links[link].free_travel_time())
            .sum()
    }
}

#[derive(Default)]
pub struct NetworkBuilder {
    nodes: Vec<Node>,
    node_zones: Vec<ZoneId>,
    links: Vec<Link>,
    node_ids: FxHashMap<String, NodeIdx>,
    link_ids: FxHashMap<String, LinkIdx>,
    representatives: Vec<(ZoneId, String)>,
}

impl NetworkBuilder {
    pub fn add_node(
        &mut self,
        external_id: impl Into<String>,
        zone: ZoneId,
    ) -> Result<NodeIdx, NetworkError> {
        let external_id = external_id.into();
        if self.node_ids.contains_key(&external_id) {
            return Err(NetworkError::DuplicateNode(external_id));
        }

        let node_idx = NodeIdx::new(self.nodes.len());
        self.node_ids.insert(external_id.clone(), node_idx);
        self.nodes.push(Node {
            external_id,
            out_links: SmallVec::new(),
        });
        self.node_zones.push(zone);

        Ok(node_idx)
    }

    pub fn add_link(
        &mut self,
        external_id: impl Into<String>,
        from: &str,
        to: &str,
        length: f64,
        freespeed: f64,
    ) -> Result<LinkIdx, NetworkError> {
        let external_id = external_id.into();
        if self.link_ids.contains_key(&external_id) {
            return Err(NetworkError::DuplicateLink(external_id));
        }

        if freespeed <= 0.0 || length < 0.0 || !length.is_finite() || !freespeed.is_finite() {
            return Err(NetworkError::InvalidLink(external_id));
        }

        let from_node = self.resolve_node(&external_id, from)?;
        let to_node = self.resolve_node(&external_id, to)?;

        let link_idx = LinkIdx::new(self.links.len());
        self.nodes[from_node].out_links.push(link_idx);
        self.link_ids.insert(external_id.clone(), link_idx);
        self.links.push(Link {
            external_id,
            from_node,
            to_node,
            length,
            freespeed,
        });

        Ok(link_idx)
    }

    pub fn set_zone_representative(
        &mut self,
        zone: ZoneId,
        node_id: impl Into<String>,
    ) -> &mut NetworkBuilder {
        self.representatives.push((zone, node_id.into()));
        self
    }

    fn resolve_node(&self, link: &str, node: &str) -> Result<NodeIdx, NetworkError> {
        self.node_ids
            .get(node)
            .copied()
            .ok_or_else(|| NetworkError::UnknownNode {
                link: link.to_string(),
                node: node.to_string(),
            })
    }

    pub fn build(self) -> Result<Network, NetworkError> {
        let mut representatives = FxHashMap::default();
        for (zone, node_id) in self.representatives {
            let node = self.node_ids.get(&node_id).copied().ok_or_else(|| {
                NetworkError::UnknownRepresentative {
                    zone,
                    node: node_id.clone(),
                }
            })?;
            representatives.insert(zone, node);
        }

        // Zones without an explicit representative fall back to their first node.
        for (index, &zone) in self.node_zones.iter().enumerate() {
            representatives.entry(zone).or_insert(NodeIdx::new(index));
        }

        Ok(Network {
            zones: ZoneIndex::new(self.node_zones, representatives),
            nodes: self.nodes,
            links: self.links,
            node_ids: self.node_ids,
            link_ids: self.link_ids,
        })
    }
}
