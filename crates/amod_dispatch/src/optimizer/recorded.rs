use std::{fs::File, io::BufReader, path::Path};

use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::OptimizerError;

use super::{fleet_optimizer::FleetOptimizer, input::OptimizerInput, output::OptimizerOutput};

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RecordedPlan {
    pub epoch_start: u64,
    pub output: OptimizerOutput,
}

/// Replays optimizer outputs recorded for each epoch start, for offline runs.
#[derive(Debug, Default)]
pub struct RecordedPlanOptimizer {
    plans: FxHashMap<u64, OptimizerOutput>,
}

impl RecordedPlanOptimizer {
    pub fn new(plans: Vec<RecordedPlan>) -> Self {
        RecordedPlanOptimizer {
            plans: plans
                .into_iter()
                .map(|plan| (plan.epoch_start, plan.output))
                .collect(),
        }
    }

    pub fn from_reader(reader: impl std::io::Read) -> Result<Self, OptimizerError> {
        let plans: Vec<RecordedPlan> = serde_json::from_reader(reader)?;
        Ok(RecordedPlanOptimizer::new(plans))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, OptimizerError> {
        let file = File::open(path)?;
        RecordedPlanOptimizer::from_reader(BufReader::new(file))
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}

impl FleetOptimizer for RecordedPlanOptimizer {
    fn optimize(
        &mut self,
        input: &OptimizerInput,
    ) -> Result<Option<OptimizerOutput>, OptimizerError> {
        let output = self.plans.get(&input.epoch_start).cloned();
        debug!(
            epoch_start = input.epoch_start,
            recorded = output.is_some(),
            "Replaying recorded plan"
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::output::OptimizerPlan;

    #[test]
    fn test_replay_by_epoch_start() {
        let json = r#"[
            {
                "epoch_start": 900,
                "output": {
                    "required_vehicles": 4,
                    "plan": { "type": "routes", "rebalance_routes": [["a", "b", "c"]] }
                }
            }
        ]"#;
        let mut optimizer = RecordedPlanOptimizer::from_reader(json.as_bytes()).unwrap();
        assert_eq!(optimizer.len(), 1);

        let mut input: OptimizerInput = serde_json::from_value(serde_json::json!({
            "epoch_start": 900,
            "horizon": 1800,
            "rebalance_weight": 1.0,
            "trip_threshold": 0.0,
            "legacy_rebalance": false,
            "vehicle_count": 0,
            "idle_vehicles": 0,
            "passengers_served": 0,
            "zones": [],
            "vehicle_distribution": [],
            "waiting_passengers": [],
            "link_occupancy": []
        }))
        .unwrap();

        let output = optimizer.optimize(&input).unwrap().unwrap();
        assert_eq!(output.required_vehicles, 4.0);
        assert!(matches!(output.plan, OptimizerPlan::Routes { .. }));

        input.epoch_start = 1800;
        assert!(optimizer.optimize(&input).unwrap().is_none());
    }
}
