use crate::params::RouteSelectionStrategy;

use super::{
    select_first_route::SelectFirstRoute, select_random_route::SelectRandomRoute,
    select_route::SelectRoute,
};

pub enum RouteSelector {
    SelectRandom(SelectRandomRoute),
    SelectFirst(SelectFirstRoute),
}

impl From<RouteSelectionStrategy> for RouteSelector {
    fn from(strategy: RouteSelectionStrategy) -> Self {
        match strategy {
            RouteSelectionStrategy::Random => RouteSelector::SelectRandom(SelectRandomRoute),
            RouteSelectionStrategy::First => RouteSelector::SelectFirst(SelectFirstRoute),
        }
    }
}

impl SelectRoute for RouteSelector {
    fn select_index(&self, count: usize, rng: &mut impl rand::Rng) -> Option<usize> {
        match self {
            RouteSelector::SelectRandom(selector) => selector.select_index(count, rng),
            RouteSelector::SelectFirst(selector) => selector.select_index(count, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::SmallRng};

    use super::*;

    #[test]
    fn test_select_index() {
        let mut rng = SmallRng::seed_from_u64(7);
        let random = RouteSelector::from(RouteSelectionStrategy::Random);
        let first = RouteSelector::from(RouteSelectionStrategy::First);

        assert_eq!(random.select_index(0, &mut rng), None);
        assert_eq!(first.select_index(0, &mut rng), None);
        assert_eq!(first.select_index(5, &mut rng), Some(0));
        for _ in 0..100 {
            assert!(random.select_index(5, &mut rng).is_some_and(|index| index < 5));
        }
    }
}
