use super::select_route::SelectRoute;

pub struct SelectRandomRoute;

impl SelectRoute for SelectRandomRoute {
    fn select_index(&self, count: usize, rng: &mut impl rand::Rng) -> Option<usize> {
        (count > 0).then(|| rng.random_range(0..count))
    }
}
