use amod_routing::zones::ZoneId;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct OptimizerOutput {
    /// Vehicles the optimizer wants on the road for the coming epoch.
    pub required_vehicles: f64,
    pub plan: OptimizerPlan,
}

impl OptimizerOutput {
    pub fn empty() -> Self {
        OptimizerOutput {
            required_vehicles: 0.0,
            plan: OptimizerPlan::Routes {
                passenger_routes: vec![],
                rebalance_routes: vec![],
            },
        }
    }
}

/// Routes are sequences of external node ids.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OptimizerPlan {
    Routes {
        #[serde(default)]
        passenger_routes: Vec<Vec<String>>,
        #[serde(default)]
        rebalance_routes: Vec<Vec<String>>,
    },
    Legacy {
        #[serde(default)]
        rebalance_queue: Vec<ZoneTargets>,
    },
}

/// Zones that idle vehicles of `zone` should be sent to, one vehicle per entry.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ZoneTargets {
    pub zone: ZoneId,
    pub targets: Vec<ZoneId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_plans() {
        let routes: OptimizerOutput = serde_json::from_str(
            r#"{
                "required_vehicles": 12.5,
                "plan": {
                    "type": "routes",
                    "passenger_routes": [["a", "b", "c"]]
                }
            }"#,
        )
        .unwrap();
        assert_eq!(routes.required_vehicles, 12.5);
        assert_eq!(
            routes.plan,
            OptimizerPlan::Routes {
                passenger_routes: vec![vec!["a".into(), "b".into(), "c".into()]],
                rebalance_routes: vec![],
            }
        );

        let legacy: OptimizerOutput = serde_json::from_str(
            r#"{
                "required_vehicles": 3,
                "plan": {
                    "type": "legacy",
                    "rebalance_queue": [{ "zone": 1, "targets": [2, 2, 3] }]
                }
            }"#,
        )
        .unwrap();
        assert_eq!(
            legacy.plan,
            OptimizerPlan::Legacy {
                rebalance_queue: vec![ZoneTargets {
                    zone: ZoneId::new(1),
                    targets: vec![ZoneId::new(2), ZoneId::new(2), ZoneId::new(3)],
                }],
            }
        );
    }
}
