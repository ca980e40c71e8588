use std::fmt::Display;

use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::network::NodeIdx;

/// Identifier of a zone ("station") partitioning the network nodes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ZoneId(u32);

impl ZoneId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl Display for ZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Static node -> zone and zone -> representative node lookup.
#[derive(Debug, Clone)]
pub struct ZoneIndex {
    node_zones: Vec<ZoneId>,
    representatives: FxHashMap<ZoneId, NodeIdx>,
    zones: Vec<ZoneId>,
}

impl ZoneIndex {
    pub(crate) fn new(node_zones: Vec<ZoneId>, representatives: FxHashMap<ZoneId, NodeIdx>) -> Self {
        let mut zones: Vec<ZoneId> = node_zones
            .iter()
            .copied()
            .chain(representatives.keys().copied())
            .collect();
        zones.sort_unstable();
        zones.dedup();

        ZoneIndex {
            node_zones,
            representatives,
            zones,
        }
    }

    #[inline(always)]
    pub fn zone_of(&self, node: NodeIdx) -> ZoneId {
        self.node_zones[node.get()]
    }

    pub fn representative(&self, zone: ZoneId) -> Option<NodeIdx> {
        self.representatives.get(&zone).copied()
    }

    /// All zones, sorted.
    pub fn zones(&self) -> &[ZoneId] {
        &self.zones
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    /// Position of the zone in `zones()`, used to lay out per-zone arrays.
    pub fn zone_position(&self, zone: ZoneId) -> Option<usize> {
        self.zones.binary_search(&zone).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_lookup() {
        let mut representatives = FxHashMap::default();
        representatives.insert(ZoneId::new(2), NodeIdx::new(2));

        let index = ZoneIndex::new(
            vec![ZoneId::new(1), ZoneId::new(1), ZoneId::new(2)],
            representatives,
        );

        assert_eq!(index.zone_of(NodeIdx::new(1)), ZoneId::new(1));
        assert_eq!(index.zone_of(NodeIdx::new(2)), ZoneId::new(2));
        assert_eq!(index.representative(ZoneId::new(2)), Some(NodeIdx::new(2)));
        assert_eq!(index.representative(ZoneId::new(1)), None);
        assert_eq!(index.zones(), &[ZoneId::new(1), ZoneId::new(2)]);
        assert_eq!(index.zone_position(ZoneId::new(2)), Some(1));
        assert_eq!(index.zone_position(ZoneId::new(3)), None);
    }
}
