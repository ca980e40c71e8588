use thiserror::Error;

use crate::{network::NodeIdx, zones::ZoneId};

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Duplicate node id {0}")]
    DuplicateNode(String),
    #[error("Duplicate link id {0}")]
    DuplicateLink(String),
    #[error("Link {link} references unknown node {node}")]
    UnknownNode { link: String, node: String },
    #[error("Link {0} needs a positive free speed and a non-negative length")]
    InvalidLink(String),
    #[error("Representative {node} of zone {zone} is not a known node")]
    UnknownRepresentative { zone: ZoneId, node: String },
    #[error("Failed to parse network: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Failed to read network: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RoutingError {
    #[error("No path from node {from} to node {to}")]
    NoPath { from: NodeIdx, to: NodeIdx },
    #[error("Search started without any source node")]
    NoSources,
    #[error("Node {0} is not part of the network")]
    UnknownNode(NodeIdx),
}
