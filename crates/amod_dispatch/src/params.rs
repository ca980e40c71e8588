use amod_routing::Time;
use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use crate::error::ParamsError;

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RouteSelectionStrategy {
    /// Uniformly random among the candidates.
    Random,
    /// Always the first candidate, for reproducible runs.
    First,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct AmodParams {
    /// Seconds between two optimizer invocations.
    pub reoptimization_period: u64,
    /// Seconds between the end of an epoch and its route tables becoming active.
    pub optimizer_delay: u64,
    /// Seconds between two merges of the retry set into the request queue.
    pub reschedule_period: u64,
    /// Planning horizon handed to the optimizer, in seconds.
    pub time_horizon: u64,
    pub rebalance_weight: f64,
    pub trip_threshold: f64,
    /// Use per-zone target queues instead of rebalance routes.
    pub legacy_rebalance: bool,
    /// Allow dispatching vehicles that are driving a rebalance trip.
    pub vehicle_diversion: bool,
    /// Only consider vehicles in the pickup zone during dispatch.
    pub zone_pruning: bool,
    /// Push overdue tasks forward after each successful optimizer call.
    pub update_timelines_on_epoch: bool,
    pub pickup_duration: Time,
    pub dropoff_duration: Time,
    pub optimizer_timeout: SignedDuration,
    /// Expected number of dispatch candidates, used to size the search maps.
    pub neighbourhood_size: usize,
    pub seed: u64,
    pub route_selection: RouteSelectionStrategy,
}

impl Default for AmodParams {
    fn default() -> Self {
        Self {
            reoptimization_period: 900,
            optimizer_delay: 60,
            reschedule_period: 60,
            time_horizon: 1800,
            rebalance_weight: 1.0,
            trip_threshold: 0.0,
            legacy_rebalance: false,
            vehicle_diversion: true,
            zone_pruning: true,
            update_timelines_on_epoch: false,
            pickup_duration: 120.0,
            dropoff_duration: 60.0,
            optimizer_timeout: SignedDuration::from_secs(30),
            neighbourhood_size: 40,
            seed: 42,
            route_selection: RouteSelectionStrategy::Random,
        }
    }
}

impl AmodParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.reoptimization_period == 0 {
            return Err(ParamsError::ZeroPeriod("reoptimization_period"));
        }
        if self.reschedule_period == 0 {
            return Err(ParamsError::ZeroPeriod("reschedule_period"));
        }
        if self.pickup_duration < 0.0 {
            return Err(ParamsError::Negative("pickup_duration"));
        }
        if self.dropoff_duration < 0.0 {
            return Err(ParamsError::Negative("dropoff_duration"));
        }
        if self.optimizer_timeout.is_negative() {
            return Err(ParamsError::Negative("optimizer_timeout"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_params_use_defaults() {
        let params: AmodParams = serde_json::from_str(
            r#"{ "reoptimization_period": 600, "optimizer_timeout": "PT5S", "route_selection": "first" }"#,
        )
        .unwrap();

        assert_eq!(params.reoptimization_period, 600);
        assert_eq!(params.optimizer_timeout, SignedDuration::from_secs(5));
        assert_eq!(params.route_selection, RouteSelectionStrategy::First);
        assert_eq!(params.reschedule_period, AmodParams::default().reschedule_period);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        let params = AmodParams {
            reschedule_period: 0,
            ..AmodParams::default()
        };
        assert_eq!(
            params.validate(),
            Err(ParamsError::ZeroPeriod("reschedule_period"))
        );

        let params = AmodParams {
            optimizer_timeout: SignedDuration::from_secs(-1),
            ..AmodParams::default()
        };
        assert_eq!(
            params.validate(),
            Err(ParamsError::Negative("optimizer_timeout"))
        );
    }
}
