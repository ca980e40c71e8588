use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use amod_dispatch::{
    request::Request,
    vehicle::{Fleet, Vehicle},
};
use amod_routing::{Time, json::JsonNetwork, network::Network};
use anyhow::{Context, anyhow};
use serde::Deserialize;

/// The network file, relative to the scenario file, or the network itself.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum JsonNetworkSource {
    File(PathBuf),
    Inline(JsonNetwork),
}

#[derive(Deserialize, Debug)]
pub struct JsonVehicle {
    pub id: String,
    pub start_link: String,
    #[serde(default)]
    pub t0: Time,
    pub t1: Time,
}

#[derive(Deserialize, Debug)]
pub struct JsonRequest {
    pub id: String,
    pub from_link: String,
    pub to_link: String,
    /// Earliest pickup time.
    pub t0: Time,
    /// Defaults to the earliest pickup time.
    pub submission_time: Option<Time>,
}

#[derive(Deserialize, Debug)]
pub struct JsonScenario {
    pub network: JsonNetworkSource,
    pub vehicles: Vec<JsonVehicle>,
    #[serde(default)]
    pub requests: Vec<JsonRequest>,
}

pub struct Scenario {
    pub network: Network,
    pub fleet: Fleet,
    /// Sorted by submission time.
    pub requests: Vec<Request>,
}

impl Scenario {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Cannot open scenario {}", path.display()))?;
        let base = path.parent().unwrap_or(Path::new("."));
        Self::from_reader(BufReader::new(file), base)
    }

    pub fn from_reader(reader: impl Read, base: &Path) -> anyhow::Result<Self> {
        let scenario: JsonScenario = serde_json::from_reader(reader)?;

        let network = match scenario.network {
            JsonNetworkSource::File(file) => JsonNetwork::from_path(base.join(file))?,
            JsonNetworkSource::Inline(network) => network,
        }
        .build_network()?;

        let link = |id: &str| {
            network
                .link_by_id(id)
                .ok_or_else(|| anyhow!("Unknown link {id}"))
        };

        let vehicles = scenario
            .vehicles
            .iter()
            .map(|vehicle| {
                Ok(Vehicle::new(
                    vehicle.id.as_str(),
                    link(&vehicle.start_link)?,
                    vehicle.t0,
                    vehicle.t1,
                ))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        let fleet = Fleet::new(vehicles);

        let mut requests = scenario
            .requests
            .iter()
            .map(|request| {
                Ok(Request::new(
                    request.id.as_str(),
                    link(&request.from_link)?,
                    link(&request.to_link)?,
                    request.t0,
                    request.submission_time.unwrap_or(request.t0),
                ))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        requests.sort_by(|a, b| a.submission_time().total_cmp(&b.submission_time()));

        Ok(Scenario {
            network,
            fleet,
            requests,
        })
    }

    /// End of the latest operating window.
    pub fn end_time(&self) -> Time {
        self.fleet
            .vehicles()
            .iter()
            .map(Vehicle::t1)
            .fold(0.0, Time::max)
    }
}
