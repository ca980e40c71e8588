use jiff::SignedDuration;
use tokio::runtime::Runtime;
use tracing::{debug, info};

use crate::error::OptimizerError;

use super::{fleet_optimizer::FleetOptimizer, input::OptimizerInput, output::OptimizerOutput};

/// Talks to an optimizer service over HTTP.
///
/// The client owns a current-thread runtime and blocks on each call, every call is bounded by
/// `timeout`.
pub struct HttpOptimizerClient {
    url: String,
    timeout: SignedDuration,
    connection: Option<Connection>,
}

struct Connection {
    runtime: Runtime,
    client: reqwest::Client,
}

impl HttpOptimizerClient {
    pub fn connect(url: impl Into<String>, timeout: SignedDuration) -> Result<Self, OptimizerError> {
        let url = url.into();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let client = reqwest::Client::builder().build()?;

        info!(url = %url, "Connected to optimizer");

        Ok(HttpOptimizerClient {
            url,
            timeout,
            connection: Some(Connection { runtime, client }),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post(
        client: &reqwest::Client,
        url: &str,
        input: &OptimizerInput,
    ) -> Result<OptimizerOutput, OptimizerError> {
        let response = client.post(url).json(input).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(OptimizerError::Api { status, message });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl FleetOptimizer for HttpOptimizerClient {
    fn optimize(
        &mut self,
        input: &OptimizerInput,
    ) -> Result<Option<OptimizerOutput>, OptimizerError> {
        let connection = self.connection.as_ref().ok_or(OptimizerError::Closed)?;
        let limit = self.timeout.unsigned_abs();

        debug!(epoch_start = input.epoch_start, "Posting optimizer input");

        connection
            .runtime
            .block_on(async {
                match tokio::time::timeout(limit, Self::post(&connection.client, &self.url, input))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(OptimizerError::Timeout(self.timeout)),
                }
            })
            .map(Some)
    }

    fn close(&mut self) {
        if self.connection.take().is_some() {
            info!(url = %self.url, "Closed optimizer connection");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_client_fails() {
        let mut client =
            HttpOptimizerClient::connect("http://127.0.0.1:9", SignedDuration::from_secs(1))
                .unwrap();
        client.close();

        let input = OptimizerInput {
            epoch_start: 0,
            horizon: 1800,
            rebalance_weight: 1.0,
            trip_threshold: 0.0,
            legacy_rebalance: false,
            vehicle_count: 0,
            idle_vehicles: 0,
            passengers_served: 0,
            zones: vec![],
            vehicle_distribution: vec![],
            waiting_passengers: vec![],
            link_occupancy: vec![],
        };

        assert!(matches!(
            client.optimize(&input),
            Err(OptimizerError::Closed)
        ));
    }
}
