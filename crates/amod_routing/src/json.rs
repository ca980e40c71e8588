use std::{fs::File, io::{BufReader, Read}, path::Path};

use serde::Deserialize;

use crate::{
    error::NetworkError,
    network::{Network, NetworkBuilder},
    zones::ZoneId,
};

#[derive(Deserialize, Debug, Clone)]
pub struct JsonNode {
    pub id: String,
    pub zone: ZoneId,
}

#[derive(Deserialize, Debug, Clone)]
pub struct JsonLink {
    pub id: String,
    pub from: String,
    pub to: String,
    pub length: f64,
    pub freespeed: f64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct JsonZone {
    pub id: ZoneId,
    pub representative: String,
}

/// Road network input: nodes with their zone, directed links and zone representatives.
#[derive(Deserialize, Debug, Clone)]
pub struct JsonNetwork {
    pub nodes: Vec<JsonNode>,
    pub links: Vec<JsonLink>,
    #[serde(default)]
    pub zones: Vec<JsonZone>,
}

impl JsonNetwork {
    pub fn from_reader(reader: impl Read) -> Result<Self, NetworkError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, NetworkError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn build_network(&self) -> Result<Network, NetworkError> {
        let mut builder = NetworkBuilder::default();

        for node in &self.nodes {
            builder.add_node(node.id.as_str(), node.zone)?;
        }

        for link in &self.links {
            builder.add_link(
                link.id.as_str(),
                &link.from,
                &link.to,
                link.length,
                link.freespeed,
            )?;
        }

        for zone in &self.zones {
            builder.set_zone_representative(zone.id, zone.representative.as_str());
        }

        builder.build()
    }
}
