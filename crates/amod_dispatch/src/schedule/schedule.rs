use amod_routing::{Time, network::LinkIdx};
use smallvec::SmallVec;

use super::task::{Task, TaskStatus, TaskType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleStatus {
    Planned,
    Started,
    Completed,
}

/// The ordered, time-contiguous tasks of one vehicle.
#[derive(Debug, Clone)]
pub struct Schedule {
    tasks: SmallVec<[Task; 8]>,
    current: Option<usize>,
    status: ScheduleStatus,
}

impl Default for Schedule {
    fn default() -> Self {
        Schedule {
            tasks: SmallVec::new(),
            current: None,
            status: ScheduleStatus::Planned,
        }
    }
}

impl Schedule {
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn status(&self) -> ScheduleStatus {
        self.status
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_task(&self) -> Option<&Task> {
        self.current.map(|index| &self.tasks[index])
    }

    pub(crate) fn current_task_mut(&mut self) -> Option<&mut Task> {
        self.current.map(|index| &mut self.tasks[index])
    }

    pub fn current_task_type(&self) -> Option<TaskType> {
        self.current_task().map(Task::task_type)
    }

    pub fn last_task(&self) -> Option<&Task> {
        self.tasks.last()
    }

    pub(crate) fn last_task_mut(&mut self) -> Option<&mut Task> {
        self.tasks.last_mut()
    }

    pub fn is_current_last(&self) -> bool {
        self.current.is_some_and(|index| index + 1 == self.tasks.len())
    }

    pub fn end_time(&self) -> Option<Time> {
        self.tasks.last().map(Task::end)
    }

    pub fn last_link(&self) -> Option<LinkIdx> {
        self.tasks.last().map(Task::end_link)
    }

    pub(crate) fn add_task(&mut self, task: Task) {
        debug_assert!(
            self.tasks.last().is_none_or(|last| last.end() == task.begin()),
            "tasks must be contiguous"
        );
        self.tasks.push(task);
    }

    pub(crate) fn remove_last_task(&mut self) -> Option<Task> {
        match self.tasks.last() {
            Some(task) if task.status() == TaskStatus::Planned => self.tasks.pop(),
            _ => None,
        }
    }

    /// Removes every task after the current one.
    pub(crate) fn remove_tasks_after_current(&mut self) {
        if let Some(index) = self.current {
            self.tasks.truncate(index + 1);
        }
    }

    /// Whether `task[i].end == task[i + 1].begin` holds for the whole schedule.
    pub fn is_contiguous(&self) -> bool {
        self.tasks
            .windows(2)
            .all(|pair| pair[0].end() == pair[1].begin())
    }

    /// Completes the current task and starts the next one at `now`.
    ///
    /// A task ending earlier or later than planned moves every following task by the same amount,
    /// the trailing stay keeps ending no earlier than `t1`. Starts a planned schedule and completes
    /// a schedule whose last task ended.
    pub fn next_task(&mut self, now: Time, t1: Time) -> ScheduleStatus {
        match self.status {
            ScheduleStatus::Planned => {
                if self.tasks.is_empty() {
                    self.status = ScheduleStatus::Completed;
                } else {
                    self.status = ScheduleStatus::Started;
                    self.current = Some(0);
                    self.tasks[0].set_status(TaskStatus::Started);
                }
            }
            ScheduleStatus::Started => {
                self.shift_timings(now, t1);

                let Some(index) = self.current else {
                    return self.status;
                };
                self.tasks[index].set_status(TaskStatus::Completed);

                if index + 1 < self.tasks.len() {
                    self.current = Some(index + 1);
                    self.tasks[index + 1].set_status(TaskStatus::Started);
                } else {
                    self.current = None;
                    self.status = ScheduleStatus::Completed;
                }
            }
            ScheduleStatus::Completed => {}
        }

        self.status
    }

    fn shift_timings(&mut self, now: Time, t1: Time) {
        let Some(index) = self.current else {
            return;
        };

        let delta = now - self.tasks[index].end();
        if delta == 0.0 {
            return;
        }

        self.tasks[index].set_end(now);

        let last = self.tasks.len() - 1;
        if index == last {
            return;
        }

        for task in &mut self.tasks[index + 1..last] {
            task.shift(delta);
        }

        let wait_task = &mut self.tasks[last];
        let begin = wait_task.begin() + delta;
        wait_task.set_begin(begin);
        if wait_task.task_type() == TaskType::Stay {
            wait_task.set_end(begin.max(t1));
        } else {
            wait_task.set_end(wait_task.end() + delta);
        }
    }

    /// Pushes tasks that can no longer happen as planned forward so they start no earlier than `now`.
    pub fn update_timeline(&mut self, now: Time, t1: Time) {
        let Some(index) = self.current else {
            return;
        };

        let current = &mut self.tasks[index];
        if current.end() < now {
            current.set_end(now);
        }

        let mut previous_end = self.tasks[index].end();
        let last = self.tasks.len() - 1;
        for task_index in index + 1..=last {
            let task = &mut self.tasks[task_index];
            let delta = previous_end - task.begin();
            if delta > 0.0 {
                if task_index == last && task.task_type() == TaskType::Stay {
                    task.set_begin(previous_end);
                    task.set_end(previous_end.max(t1));
                } else {
                    task.shift(delta);
                }
            }
            previous_end = task.end();
        }
    }
}

#[cfg(test)]
mod tests {
    use amod_routing::network::LinkIdx;

    use super::*;
    use crate::{request::RequestIdx, schedule::task::TaskKind};

    fn create_schedule() -> Schedule {
        let link = LinkIdx::new(0);
        let request = RequestIdx::new(0);
        let mut schedule = Schedule::default();
        schedule.add_task(Task::new(0.0, 100.0, TaskKind::Pickup { request, link }));
        schedule.add_task(Task::new(100.0, 160.0, TaskKind::Dropoff { request, link }));
        schedule.add_task(Task::stay(160.0, 1000.0, link));
        schedule
    }

    #[test]
    fn test_next_task_lifecycle() {
        let mut schedule = create_schedule();

        assert_eq!(schedule.next_task(0.0, 1000.0), ScheduleStatus::Started);
        assert_eq!(schedule.current_index(), Some(0));
        assert_eq!(schedule.tasks()[0].status(), TaskStatus::Started);

        schedule.next_task(100.0, 1000.0);
        schedule.next_task(160.0, 1000.0);
        assert_eq!(schedule.current_task_type(), Some(TaskType::Stay));
        assert!(schedule.is_current_last());

        assert_eq!(schedule.next_task(1000.0, 1000.0), ScheduleStatus::Completed);
        assert!(
            schedule
                .tasks()
                .iter()
                .all(|task| task.status() == TaskStatus::Completed)
        );
    }

    #[test]
    fn test_early_cutover_shifts_following_tasks() {
        let mut schedule = create_schedule();
        schedule.next_task(0.0, 1000.0);

        // The current task ends 20 seconds early.
        schedule.next_task(80.0, 1000.0);

        let tasks = schedule.tasks();
        assert_eq!(tasks[0].end(), 80.0);
        assert_eq!((tasks[1].begin(), tasks[1].end()), (80.0, 140.0));
        assert_eq!((tasks[2].begin(), tasks[2].end()), (140.0, 1000.0));
        assert!(schedule.is_contiguous());
    }

    #[test]
    fn test_late_cutover_clamps_trailing_stay() {
        let mut schedule = create_schedule();
        schedule.next_task(0.0, 150.0);

        schedule.next_task(130.0, 150.0);

        let tasks = schedule.tasks();
        assert_eq!((tasks[1].begin(), tasks[1].end()), (130.0, 190.0));
        // The stay now starts after t1 and ends where it begins.
        assert_eq!((tasks[2].begin(), tasks[2].end()), (190.0, 190.0));
        assert!(schedule.is_contiguous());
    }

    #[test]
    fn test_update_timeline() {
        let mut schedule = create_schedule();
        schedule.next_task(0.0, 1000.0);

        schedule.update_timeline(130.0, 1000.0);

        let tasks = schedule.tasks();
        assert_eq!(tasks[0].end(), 130.0);
        assert_eq!((tasks[1].begin(), tasks[1].end()), (130.0, 190.0));
        assert_eq!((tasks[2].begin(), tasks[2].end()), (190.0, 1000.0));
        assert!(schedule.is_contiguous());
    }
}
