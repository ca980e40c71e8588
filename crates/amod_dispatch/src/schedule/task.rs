use amod_routing::{Time, network::LinkIdx, timed_path::TimedPath};

use crate::request::RequestIdx;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Planned,
    Started,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskType {
    Stay,
    EmptyDrive,
    Rebalance,
    Pickup,
    OccupiedDrive,
    Dropoff,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskKind {
    /// Idle on a link.
    Stay { link: LinkIdx },
    /// Empty drive toward a pickup.
    EmptyDrive { path: TimedPath },
    /// Empty drive toward a zone with anticipated demand.
    Rebalance { path: TimedPath },
    Pickup { request: RequestIdx, link: LinkIdx },
    OccupiedDrive { request: RequestIdx, path: TimedPath },
    Dropoff { request: RequestIdx, link: LinkIdx },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    begin: Time,
    end: Time,
    status: TaskStatus,
    kind: TaskKind,
}

impl Task {
    pub fn new(begin: Time, end: Time, kind: TaskKind) -> Self {
        Task {
            begin,
            end,
            status: TaskStatus::Planned,
            kind,
        }
    }

    pub fn stay(begin: Time, end: Time, link: LinkIdx) -> Self {
        Task::new(begin, end, TaskKind::Stay { link })
    }

    pub fn empty_drive(path: TimedPath) -> Self {
        Task::new(
            path.departure_time(),
            path.arrival_time(),
            TaskKind::EmptyDrive { path },
        )
    }

    pub fn rebalance(path: TimedPath) -> Self {
        Task::new(
            path.departure_time(),
            path.arrival_time(),
            TaskKind::Rebalance { path },
        )
    }

    pub fn occupied_drive(request: RequestIdx, path: TimedPath) -> Self {
        Task::new(
            path.departure_time(),
            path.arrival_time(),
            TaskKind::OccupiedDrive { request, path },
        )
    }

    pub fn begin(&self) -> Time {
        self.begin
    }

    pub fn end(&self) -> Time {
        self.end
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn kind(&self) -> &TaskKind {
        &self.kind
    }

    pub(crate) fn kind_mut(&mut self) -> &mut TaskKind {
        &mut self.kind
    }

    pub fn task_type(&self) -> TaskType {
        match self.kind {
            TaskKind::Stay { .. } => TaskType::Stay,
            TaskKind::EmptyDrive { .. } => TaskType::EmptyDrive,
            TaskKind::Rebalance { .. } => TaskType::Rebalance,
            TaskKind::Pickup { .. } => TaskType::Pickup,
            TaskKind::OccupiedDrive { .. } => TaskType::OccupiedDrive,
            TaskKind::Dropoff { .. } => TaskType::Dropoff,
        }
    }

    pub fn path(&self) -> Option<&TimedPath> {
        match &self.kind {
            TaskKind::EmptyDrive { path }
            | TaskKind::Rebalance { path }
            | TaskKind::OccupiedDrive { path, .. } => Some(path),
            TaskKind::Stay { .. } | TaskKind::Pickup { .. } | TaskKind::Dropoff { .. } => None,
        }
    }

    /// The link the vehicle is on when the task ends.
    pub fn end_link(&self) -> LinkIdx {
        match &self.kind {
            TaskKind::Stay { link } | TaskKind::Pickup { link, .. } | TaskKind::Dropoff { link, .. } => {
                *link
            }
            TaskKind::EmptyDrive { path }
            | TaskKind::Rebalance { path }
            | TaskKind::OccupiedDrive { path, .. } => path.to_link(),
        }
    }

    pub(crate) fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
    }

    pub(crate) fn set_begin(&mut self, begin: Time) {
        self.begin = begin;
    }

    pub(crate) fn set_end(&mut self, end: Time) {
        self.end = end;
    }

    /// Moves the task, and the departure of its path, by `delta`.
    pub(crate) fn shift(&mut self, delta: Time) {
        self.begin += delta;
        self.end += delta;
        match &mut self.kind {
            TaskKind::EmptyDrive { path }
            | TaskKind::Rebalance { path }
            | TaskKind::OccupiedDrive { path, .. } => {
                path.set_departure_time(path.departure_time() + delta);
            }
            TaskKind::Stay { .. } | TaskKind::Pickup { .. } | TaskKind::Dropoff { .. } => {}
        }
    }
}
