use crate::error::OptimizerError;

use super::{input::OptimizerInput, output::OptimizerOutput};

/// The external optimizer, invoked once per decision epoch.
pub trait FleetOptimizer {
    /// `None` means there is no new plan for this epoch and the active route tables stay.
    fn optimize(
        &mut self,
        input: &OptimizerInput,
    ) -> Result<Option<OptimizerOutput>, OptimizerError>;

    /// Releases the connection. Later calls fail with `OptimizerError::Closed`.
    fn close(&mut self) {}
}
