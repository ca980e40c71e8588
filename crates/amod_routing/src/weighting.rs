use crate::{Cost, Time, network::Link};

pub trait Weighting {
    fn calc_link_travel_time(&self, link: &Link, time: Time) -> Time;
    fn calc_link_cost(&self, link: &Link, time: Time) -> Cost;
}

/// Uncongested travel: time is `length / freespeed` and the cost is the time itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct FreeSpeedWeighting;

impl Weighting for FreeSpeedWeighting {
    #[inline(always)]
    fn calc_link_travel_time(&self, link: &Link, _time: Time) -> Time {
        link.free_travel_time()
    }

    #[inline(always)]
    fn calc_link_cost(&self, link: &Link, time: Time) -> Cost {
        self.calc_link_travel_time(link, time)
    }
}
