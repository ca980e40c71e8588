use crate::error::OptimizerError;

use super::{
    fleet_optimizer::FleetOptimizer, http_client::HttpOptimizerClient, input::OptimizerInput,
    output::OptimizerOutput, recorded::RecordedPlanOptimizer,
};

/// The optimizer handle built once at startup and owned by the controller.
pub enum OptimizerClient {
    Http(HttpOptimizerClient),
    Recorded(RecordedPlanOptimizer),
    /// Every epoch yields an empty plan, dispatch then always routes directly.
    Disabled,
}

impl FleetOptimizer for OptimizerClient {
    fn optimize(
        &mut self,
        input: &OptimizerInput,
    ) -> Result<Option<OptimizerOutput>, OptimizerError> {
        match self {
            OptimizerClient::Http(client) => client.optimize(input),
            OptimizerClient::Recorded(client) => client.optimize(input),
            OptimizerClient::Disabled => Ok(Some(OptimizerOutput::empty())),
        }
    }

    fn close(&mut self) {
        match self {
            OptimizerClient::Http(client) => client.close(),
            OptimizerClient::Recorded(client) => client.close(),
            OptimizerClient::Disabled => {}
        }
    }
}
