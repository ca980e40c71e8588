use amod_routing::{
    Time,
    network::{LinkIdx, Network},
    path::Path,
    timed_path::TimedPath,
};

use crate::{
    error::SchedulingError,
    params::AmodParams,
    request::{Request, RequestIdx, RequestStatus},
    vehicle::Vehicle,
};

use super::{
    schedule::ScheduleStatus,
    task::{Task, TaskKind, TaskStatus, TaskType},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DepartureKind {
    /// Waiting at the end of its schedule.
    Idle,
    /// Leaving a rebalance drive at the end of the link with this index in the drive's path.
    Diversion { link_index: usize },
}

/// Where and when a vehicle can start a new drive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Departure {
    pub link: LinkIdx,
    pub time: Time,
    pub kind: DepartureKind,
}

/// Applies dispatch and rebalance decisions to vehicle schedules.
#[derive(Debug, Clone)]
pub struct Scheduler {
    pickup_duration: Time,
    dropoff_duration: Time,
    vehicle_diversion: bool,
}

impl Scheduler {
    pub fn new(params: &AmodParams) -> Self {
        Scheduler {
            pickup_duration: params.pickup_duration,
            dropoff_duration: params.dropoff_duration,
            vehicle_diversion: params.vehicle_diversion,
        }
    }

    /// The vehicle is staying on a link with nothing planned after.
    pub fn is_idle(&self, vehicle: &Vehicle, now: Time) -> bool {
        let schedule = vehicle.schedule();
        now < vehicle.t1()
            && schedule.status() == ScheduleStatus::Started
            && schedule.is_current_last()
            && schedule.current_task_type() == Some(TaskType::Stay)
    }

    /// Immediate diversion when possible, otherwise the earliest idleness.
    ///
    /// Returns `None` if the vehicle cannot depart before the end of its operating window.
    pub fn departure(&self, vehicle: &Vehicle, now: Time) -> Option<Departure> {
        if now >= vehicle.t1() {
            return None;
        }

        let departure = if self.vehicle_diversion {
            self.immediate_diversion(vehicle, now)
                .or_else(|| self.earliest_idleness(vehicle, now))
        } else {
            self.earliest_idleness(vehicle, now)
        }?;

        (departure.time < vehicle.t1()).then_some(departure)
    }

    /// A vehicle driving a rebalance trip with only its trailing stay planned after it can leave
    /// at the end of the link it is on.
    fn immediate_diversion(&self, vehicle: &Vehicle, now: Time) -> Option<Departure> {
        let schedule = vehicle.schedule();
        if schedule.status() != ScheduleStatus::Started {
            return None;
        }

        let index = schedule.current_index()?;
        let tasks = schedule.tasks();
        if index + 2 != tasks.len() || tasks[index + 1].task_type() != TaskType::Stay {
            return None;
        }

        let TaskKind::Rebalance { path } = tasks[index].kind() else {
            return None;
        };

        let (link_index, time) = path.diversion_point(now)?;
        Some(Departure {
            link: path.links()[link_index],
            time,
            kind: DepartureKind::Diversion { link_index },
        })
    }

    fn earliest_idleness(&self, vehicle: &Vehicle, now: Time) -> Option<Departure> {
        let schedule = vehicle.schedule();
        match schedule.status() {
            ScheduleStatus::Completed => None,
            ScheduleStatus::Planned | ScheduleStatus::Started => match schedule.last_task() {
                Some(task) => match task.kind() {
                    TaskKind::Stay { link } => Some(Departure {
                        link: *link,
                        time: task.begin().max(now),
                        kind: DepartureKind::Idle,
                    }),
                    _ => None,
                },
                None => Some(Departure {
                    link: vehicle.start_link(),
                    time: vehicle.t0().max(now),
                    kind: DepartureKind::Idle,
                }),
            },
        }
    }

    pub fn pickup_end_time(&self, arrival_time: Time, request: &Request) -> Time {
        arrival_time.max(request.t0()) + self.pickup_duration
    }

    /// Appends the drive to the pickup and the pickup itself. Returns the pickup end time.
    ///
    /// A diverted rebalance drive is cut at the diversion link, otherwise the trailing stay is
    /// trimmed.
    pub fn schedule_pickup(
        &self,
        vehicle: &mut Vehicle,
        request_idx: RequestIdx,
        request: &mut Request,
        departure: &Departure,
        to_pickup: TimedPath,
        now: Time,
    ) -> Result<Time, SchedulingError> {
        if request.status() != RequestStatus::Unplanned {
            return Err(SchedulingError::RequestNotUnplanned(request_idx));
        }

        match departure.kind {
            DepartureKind::Idle => trim_trailing_stay(vehicle, now)?,
            DepartureKind::Diversion { link_index } => {
                divert_rebalance_drive(vehicle, departure.link, link_index)?
            }
        }

        let start_time = start_time(vehicle, now);
        let to_pickup = to_pickup.with_departure(start_time);
        let arrival_time = to_pickup.arrival_time();
        let pickup_end = self.pickup_end_time(arrival_time, request);

        let schedule = vehicle.schedule_mut();
        schedule.add_task(Task::empty_drive(to_pickup));
        schedule.add_task(Task::new(
            arrival_time,
            pickup_end,
            TaskKind::Pickup {
                request: request_idx,
                link: request.from_link(),
            },
        ));

        request.set_status(RequestStatus::Dispatched);

        Ok(pickup_end)
    }

    /// Appends the occupied drive, the dropoff and a new trailing stay.
    pub fn schedule_dropoff(
        &self,
        vehicle: &mut Vehicle,
        request_idx: RequestIdx,
        request: &Request,
        payload: TimedPath,
    ) {
        let arrival_time = payload.arrival_time();
        let dropoff_end = arrival_time + self.dropoff_duration;

        let schedule = vehicle.schedule_mut();
        schedule.add_task(Task::occupied_drive(request_idx, payload));
        schedule.add_task(Task::new(
            arrival_time,
            dropoff_end,
            TaskKind::Dropoff {
                request: request_idx,
                link: request.to_link(),
            },
        ));

        append_stay(vehicle);
    }

    /// Sends the vehicle along `route`, which starts at the end of its stay link.
    ///
    /// Returns `false` without touching the schedule when nothing is left of the route once the
    /// stay link is removed from its front, or when it ends on the stay link.
    pub fn schedule_rebalance(
        &self,
        network: &Network,
        vehicle: &mut Vehicle,
        route: &Path,
        now: Time,
    ) -> Result<bool, SchedulingError> {
        let stay_link = match vehicle.schedule().last_task().map(Task::kind) {
            Some(TaskKind::Stay { link }) => *link,
            _ => {
                return Err(SchedulingError::MissingTrailingStay {
                    vehicle: vehicle.id().to_string(),
                });
            }
        };

        let mut links = route.links();
        if links.first() == Some(&stay_link) {
            links = &links[1..];
        }

        match links.last() {
            None => return Ok(false),
            Some(&destination) if destination == stay_link => return Ok(false),
            Some(_) => {}
        }

        trim_trailing_stay(vehicle, now)?;

        let mut sequence = Vec::with_capacity(links.len() + 1);
        sequence.push(stay_link);
        sequence.extend_from_slice(links);

        let path = TimedPath::from_link_sequence(network, sequence, start_time(vehicle, now));
        vehicle.schedule_mut().add_task(Task::rebalance(path));
        append_stay(vehicle);

        Ok(true)
    }
}

/// Removes a planned trailing stay, or cuts a started one at `now`.
fn trim_trailing_stay(vehicle: &mut Vehicle, now: Time) -> Result<(), SchedulingError> {
    let vehicle_id = vehicle.id().to_string();
    let schedule = vehicle.schedule_mut();
    if schedule.status() == ScheduleStatus::Completed {
        return Err(SchedulingError::ScheduleCompleted {
            vehicle: vehicle_id,
        });
    }

    let Some(last) = schedule.last_task_mut() else {
        return Ok(());
    };

    if last.task_type() != TaskType::Stay {
        return Err(SchedulingError::MissingTrailingStay {
            vehicle: vehicle_id,
        });
    }

    match last.status() {
        TaskStatus::Planned => {
            schedule.remove_last_task();
        }
        TaskStatus::Started => last.set_end(now),
        TaskStatus::Completed => {
            return Err(SchedulingError::CompletedTrailingStay {
                vehicle: vehicle_id,
            });
        }
    }

    Ok(())
}

/// Drops everything after the current rebalance drive and ends it at the end of `link`.
fn divert_rebalance_drive(
    vehicle: &mut Vehicle,
    link: LinkIdx,
    link_index: usize,
) -> Result<(), SchedulingError> {
    let invalid = || SchedulingError::InvalidDiversion {
        vehicle: vehicle.id().to_string(),
        link,
    };

    let schedule = vehicle.schedule();
    let is_valid = matches!(
        schedule.current_task().map(Task::kind),
        Some(TaskKind::Rebalance { path }) if path.links().get(link_index) == Some(&link)
    );
    if !is_valid {
        return Err(invalid());
    }

    let schedule = vehicle.schedule_mut();
    schedule.remove_tasks_after_current();
    if let Some(task) = schedule.current_task_mut() {
        if let TaskKind::Rebalance { path } = task.kind_mut() {
            path.truncate_at(link_index);
            let arrival_time = path.arrival_time();
            task.set_end(arrival_time);
        }
    }

    Ok(())
}

fn start_time(vehicle: &Vehicle, now: Time) -> Time {
    vehicle
        .schedule()
        .end_time()
        .unwrap_or_else(|| vehicle.t0().max(now))
}

fn append_stay(vehicle: &mut Vehicle) {
    let begin = start_time(vehicle, vehicle.t0());
    let end = begin.max(vehicle.t1());
    let link = vehicle.last_link();
    vehicle.schedule_mut().add_task(Task::stay(begin, end, link));
}
