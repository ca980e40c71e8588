use amod_routing::{Time, define_index_newtype, network::LinkIdx};
use tracing::debug;

use crate::{
    request::{RequestStatus, Requests},
    schedule::{
        schedule::{Schedule, ScheduleStatus},
        task::{Task, TaskKind},
    },
};

define_index_newtype!(VehicleIdx, Vehicle);

#[derive(Debug, Clone)]
pub struct Vehicle {
    id: String,
    start_link: LinkIdx,
    /// Start of the operating window.
    t0: Time,
    /// End of the operating window.
    t1: Time,
    schedule: Schedule,
}

impl Vehicle {
    /// A vehicle waiting on `start_link` for its whole operating window.
    pub fn new(id: impl Into<String>, start_link: LinkIdx, t0: Time, t1: Time) -> Self {
        let mut schedule = Schedule::default();
        schedule.add_task(Task::stay(t0, t1.max(t0), start_link));

        Vehicle {
            id: id.into(),
            start_link,
            t0,
            t1,
            schedule,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn start_link(&self) -> LinkIdx {
        self.start_link
    }

    pub fn t0(&self) -> Time {
        self.t0
    }

    pub fn t1(&self) -> Time {
        self.t1
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub(crate) fn schedule_mut(&mut self) -> &mut Schedule {
        &mut self.schedule
    }

    /// Link at the end of the schedule.
    pub fn last_link(&self) -> LinkIdx {
        self.schedule.last_link().unwrap_or(self.start_link)
    }

    /// Moves the schedule through every task whose end has passed.
    ///
    /// Request statuses follow the tasks: `PickedUp` when the occupied drive starts and `Completed`
    /// when the dropoff ends.
    pub fn advance(&mut self, now: Time, requests: &mut Requests) {
        let status_before = self.schedule.status();
        if status_before == ScheduleStatus::Planned {
            match self.schedule.tasks().first() {
                Some(first) if first.begin() <= now => {
                    self.schedule.next_task(now, self.t1);
                }
                None if now >= self.t0 => {
                    self.schedule.next_task(now, self.t1);
                }
                _ => return,
            }
        }

        while let Some(current) = self.schedule.current_task() {
            if current.end() > now {
                break;
            }

            if let TaskKind::Dropoff { request, .. } = current.kind() {
                requests
                    .get_mut(*request)
                    .set_status(RequestStatus::Completed);
            }

            self.schedule.next_task(now, self.t1);

            if let Some(TaskKind::OccupiedDrive { request, .. }) =
                self.schedule.current_task().map(Task::kind)
            {
                requests.get_mut(*request).set_status(RequestStatus::PickedUp);
            }
        }

        if status_before != ScheduleStatus::Completed
            && self.schedule.status() == ScheduleStatus::Completed
        {
            debug!(vehicle = %self.id, "Schedule completed");
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct Fleet {
    vehicles: Vec<Vehicle>,
}

impl Fleet {
    pub fn new(vehicles: Vec<Vehicle>) -> Self {
        Fleet { vehicles }
    }

    pub fn get(&self, idx: VehicleIdx) -> &Vehicle {
        &self.vehicles[idx]
    }

    pub fn get_mut(&mut self, idx: VehicleIdx) -> &mut Vehicle {
        &mut self.vehicles[idx]
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn iter_idx(&self) -> impl Iterator<Item = (VehicleIdx, &Vehicle)> {
        self.vehicles
            .iter()
            .enumerate()
            .map(|(index, vehicle)| (VehicleIdx::new(index), vehicle))
    }

    pub fn advance(&mut self, now: Time, requests: &mut Requests) {
        for vehicle in &mut self.vehicles {
            vehicle.advance(now, requests);
        }
    }

    pub fn update_timelines(&mut self, now: Time) {
        for vehicle in &mut self.vehicles {
            vehicle.schedule.update_timeline(now, vehicle.t1);
        }
    }
}
