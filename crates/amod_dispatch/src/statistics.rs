use amod_routing::Time;
use serde::Serialize;
use tracing::info;

use crate::{
    schedule::{schedule::ScheduleStatus, task::TaskKind},
    vehicle::Fleet,
};

/// Fleet state counts and running totals of the controller's decisions.
#[derive(Serialize, Debug, Default, Clone, PartialEq)]
pub struct FleetStatistics {
    pub idle: usize,
    pub serving: usize,
    pub rebalancing: usize,
    pub passengers_on_board: usize,
    pub dispatches: usize,
    pub mid_route_dispatches: usize,
    pub rebalance_trips: usize,
    pub rolled_over: usize,
}

impl FleetStatistics {
    /// Recounts vehicle states from the current task of every vehicle on the road at `now`.
    pub fn count_vehicles(&mut self, fleet: &Fleet, now: Time) {
        self.idle = 0;
        self.serving = 0;
        self.rebalancing = 0;
        self.passengers_on_board = 0;

        for vehicle in fleet.vehicles() {
            if now >= vehicle.t1() || vehicle.schedule().status() != ScheduleStatus::Started {
                continue;
            }

            let Some(task) = vehicle.schedule().current_task() else {
                continue;
            };

            match task.kind() {
                TaskKind::Stay { .. } => self.idle += 1,
                TaskKind::Rebalance { .. } => self.rebalancing += 1,
                TaskKind::EmptyDrive { .. } | TaskKind::Pickup { .. } => self.serving += 1,
                TaskKind::OccupiedDrive { .. } | TaskKind::Dropoff { .. } => {
                    self.serving += 1;
                    self.passengers_on_board += 1;
                }
            }
        }
    }

    pub fn log(&self, now: u64) {
        info!(
            now,
            idle = self.idle,
            serving = self.serving,
            rebalancing = self.rebalancing,
            on_board = self.passengers_on_board,
            dispatches = self.dispatches,
            mid_route_dispatches = self.mid_route_dispatches,
            rebalance_trips = self.rebalance_trips,
            rolled_over = self.rolled_over,
            "Fleet statistics"
        );
    }
}
