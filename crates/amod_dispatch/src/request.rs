use std::{cmp::Ordering, collections::BinaryHeap};

use amod_routing::{Time, define_index_newtype, network::LinkIdx};

define_index_newtype!(RequestIdx, Request);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    Unplanned,
    Dispatched,
    PickedUp,
    Completed,
}

#[derive(Debug, Clone)]
pub struct Request {
    id: String,
    from_link: LinkIdx,
    to_link: LinkIdx,
    /// Earliest pickup time.
    t0: Time,
    submission_time: Time,
    status: RequestStatus,
}

impl Request {
    pub fn new(
        id: impl Into<String>,
        from_link: LinkIdx,
        to_link: LinkIdx,
        t0: Time,
        submission_time: Time,
    ) -> Self {
        Request {
            id: id.into(),
            from_link,
            to_link,
            t0,
            submission_time,
            status: RequestStatus::Unplanned,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn from_link(&self) -> LinkIdx {
        self.from_link
    }

    pub fn to_link(&self) -> LinkIdx {
        self.to_link
    }

    pub fn t0(&self) -> Time {
        self.t0
    }

    pub fn submission_time(&self) -> Time {
        self.submission_time
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: RequestStatus) {
        self.status = status;
    }
}

/// All requests submitted so far, addressed by `RequestIdx`.
#[derive(Debug, Default)]
pub struct Requests {
    requests: Vec<Request>,
}

impl Requests {
    pub fn add(&mut self, request: Request) -> RequestIdx {
        let idx = RequestIdx::new(self.requests.len());
        self.requests.push(request);
        idx
    }

    pub fn get(&self, idx: RequestIdx) -> &Request {
        &self.requests[idx]
    }

    pub fn get_mut(&mut self, idx: RequestIdx) -> &mut Request {
        &mut self.requests[idx]
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Request> {
        self.requests.iter()
    }

    pub fn count_with_status(&self, status: RequestStatus) -> usize {
        self.requests.iter().filter(|r| r.status == status).count()
    }
}

#[derive(Debug, Clone, Copy)]
struct QueueItem {
    t0: Time,
    request: RequestIdx,
}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueItem {}

impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // Flip to make this a min-heap on (t0, index)
        other
            .t0
            .total_cmp(&self.t0)
            .then_with(|| other.request.cmp(&self.request))
    }
}

/// Unplanned requests ordered by earliest pickup time, plus the requests deferred to the next
/// retry flush.
#[derive(Debug, Default)]
pub struct RequestQueue {
    unplanned: BinaryHeap<QueueItem>,
    retry: Vec<RequestIdx>,
}

impl RequestQueue {
    pub fn push(&mut self, request: RequestIdx, t0: Time) {
        self.unplanned.push(QueueItem { t0, request });
    }

    pub fn pop(&mut self) -> Option<RequestIdx> {
        self.unplanned.pop().map(|item| item.request)
    }

    /// Moves a request that could not be dispatched to the retry set.
    pub fn defer(&mut self, request: RequestIdx) {
        self.retry.push(request);
    }

    /// Merges the retry set back into the queue and clears it.
    pub fn flush_retries(&mut self, requests: &Requests) -> usize {
        let count = self.retry.len();
        for request in self.retry.drain(..) {
            self.unplanned.push(QueueItem {
                t0: requests.get(request).t0(),
                request,
            });
        }
        count
    }

    pub fn unplanned_len(&self) -> usize {
        self.unplanned.len()
    }

    pub fn retry(&self) -> &[RequestIdx] {
        &self.retry
    }

    pub fn is_empty(&self) -> bool {
        self.unplanned.is_empty() && self.retry.is_empty()
    }

    /// Every request still waiting for a vehicle.
    pub fn pending(&self) -> impl Iterator<Item = RequestIdx> {
        self.unplanned
            .iter()
            .map(|item| item.request)
            .chain(self.retry.iter().copied())
    }
}
