use super::select_route::SelectRoute;

pub struct SelectFirstRoute;

impl SelectRoute for SelectFirstRoute {
    fn select_index(&self, count: usize, _: &mut impl rand::Rng) -> Option<usize> {
        (count > 0).then_some(0)
    }
}
