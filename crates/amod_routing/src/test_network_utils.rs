use crate::{
    Time,
    network::{LinkIdx, Network, NetworkBuilder, NodeIdx},
    zones::ZoneId,
};

pub const LINK_LENGTH: f64 = 100.0;
pub const LINK_FREESPEED: f64 = 10.0;
pub const LINK_TRAVEL_TIME: Time = LINK_LENGTH / LINK_FREESPEED;

/// A `rows x cols` grid with links in both directions between horizontal and vertical neighbours.
pub struct GridNetwork {
    pub network: Network,
}

impl GridNetwork {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::with_zones(rows, cols, |_, _| ZoneId::new(1))
    }

    pub fn with_zones(rows: usize, cols: usize, zone: impl Fn(usize, usize) -> ZoneId) -> Self {
        let mut builder = NetworkBuilder::default();

        for row in 0..rows {
            for col in 0..cols {
                builder.add_node(node_id(row, col), zone(row, col)).unwrap();
            }
        }

        for row in 0..rows {
            for col in 0..cols {
                let mut neighbours = vec![];
                if row + 1 < rows {
                    neighbours.push((row + 1, col));
                }
                if col + 1 < cols {
                    neighbours.push((row, col + 1));
                }

                for (other_row, other_col) in neighbours {
                    let from = node_id(row, col);
                    let to = node_id(other_row, other_col);
                    builder
                        .add_link(link_id(&from, &to), &from, &to, LINK_LENGTH, LINK_FREESPEED)
                        .unwrap();
                    builder
                        .add_link(link_id(&to, &from), &to, &from, LINK_LENGTH, LINK_FREESPEED)
                        .unwrap();
                }
            }
        }

        GridNetwork {
            network: builder.build().unwrap(),
        }
    }

    pub fn node(&self, row: usize, col: usize) -> NodeIdx {
        self.network.node_by_id(&node_id(row, col)).unwrap()
    }

    pub fn link(&self, from: (usize, usize), to: (usize, usize)) -> LinkIdx {
        let from = node_id(from.0, from.1);
        let to = node_id(to.0, to.1);
        self.network.link_by_id(&link_id(&from, &to)).unwrap()
    }
}

fn node_id(row: usize, col: usize) -> String {
    format!("{row}_{col}")
}

fn link_id(from: &str, to: &str) -> String {
    format!("{from}-{to}")
}
