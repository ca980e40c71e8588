use crate::{
    Time,
    network::{LinkIdx, Network},
    path::Path,
};

/// Time spent on the first link of a timed path. The vehicle is already at its end.
pub const FIRST_LINK_TRAVEL_TIME: Time = 1.0;

/// A link sequence with a departure time and a per-link travel time breakdown.
///
/// A timed path from link `A` to link `B` is `[A] + interior + [B]`: the vehicle departs from the end
/// of `A` and arrives at the end of `B`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedPath {
    departure_time: Time,
    links: Vec<LinkIdx>,
    link_travel_times: Vec<Time>,
    travel_time: Time,
}

impl TimedPath {
    /// The path of a vehicle that is already on its destination link.
    pub fn zero_length(link: LinkIdx, departure_time: Time) -> Self {
        TimedPath {
            departure_time,
            links: vec![link],
            link_travel_times: vec![0.0],
            travel_time: 0.0,
        }
    }

    /// Wraps a node path between `from_link` and `to_link`.
    ///
    /// `inner` must start at the end of `from_link` and end at the start of `to_link`.
    pub fn between_links(
        network: &Network,
        from_link: LinkIdx,
        to_link: LinkIdx,
        inner: &Path,
        departure_time: Time,
    ) -> Self {
        if from_link == to_link {
            return TimedPath::zero_length(from_link, departure_time);
        }

        debug_assert_eq!(network.link(from_link).to_node(), inner.first_node());
        debug_assert_eq!(network.link(to_link).from_node(), inner.last_node());

        let mut links = Vec::with_capacity(inner.link_count() + 2);
        links.push(from_link);
        links.extend_from_slice(inner.links());
        links.push(to_link);

        TimedPath::from_link_sequence(network, links, departure_time)
    }

    /// Times an explicit link sequence, starting at the end of its first link.
    pub fn from_link_sequence(network: &Network, links: Vec<LinkIdx>, departure_time: Time) -> Self {
        // A single link means the vehicle is already there.
        let link_travel_times: Vec<Time> = if links.len() <= 1 {
            vec![0.0; links.len()]
        } else {
            links
                .iter()
                .enumerate()
                .map(|(index, &link)| {
                    if index == 0 {
                        FIRST_LINK_TRAVEL_TIME
                    } else {
                        network.link(link).free_travel_time()
                    }
                })
                .collect()
        };
        let travel_time = link_travel_times.iter().sum();

        TimedPath {
            departure_time,
            links,
            link_travel_times,
            travel_time,
        }
    }

    pub fn with_departure(mut self, departure_time: Time) -> Self {
        self.departure_time = departure_time;
        self
    }

    pub fn set_departure_time(&mut self, departure_time: Time) {
        self.departure_time = departure_time;
    }

    pub fn departure_time(&self) -> Time {
        self.departure_time
    }

    pub fn travel_time(&self) -> Time {
        self.travel_time
    }

    pub fn arrival_time(&self) -> Time {
        self.departure_time + self.travel_time
    }

    pub fn links(&self) -> &[LinkIdx] {
        &self.links
    }

    pub fn link_travel_times(&self) -> &[Time] {
        &self.link_travel_times
    }

    pub fn from_link(&self) -> LinkIdx {
        self.links[0]
    }

    pub fn to_link(&self) -> LinkIdx {
        self.links[self.links.len() - 1]
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Index of the link being traversed at `time`, clamped to the path.
    pub fn link_index_at(&self, time: Time) -> usize {
        let mut link_end = self.departure_time;
        for (index, travel_time) in self.link_travel_times.iter().enumerate() {
            link_end += travel_time;
            if time < link_end {
                return index;
            }
        }
        self.links.len() - 1
    }

    /// The link being traversed at `time` and the time its end is reached.
    ///
    /// Returns `None` once the vehicle is on the last link, there is nothing left to divert.
    pub fn diversion_point(&self, time: Time) -> Option<(usize, Time)> {
        let index = self.link_index_at(time);
        if index + 1 >= self.links.len() {
            return None;
        }

        let link_end = self.departure_time + self.link_travel_times[..=index].iter().sum::<Time>();
        Some((index, link_end))
    }

    /// Drops every link after `index`, so the path ends at the end of link `index`.
    pub fn truncate_at(&mut self, index: usize) {
        self.links.truncate(index + 1);
        self.link_travel_times.truncate(index + 1);
        self.travel_time = self.link_travel_times.iter().sum();
    }
}
