pub trait SelectRoute {
    /// Index of the chosen candidate among `count`, `None` when there is none.
    fn select_index(&self, count: usize, rng: &mut impl rand::Rng) -> Option<usize>;
}
