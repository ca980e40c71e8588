use amod_routing::path::Path;

/// Rebalance routes starting in one zone. Each route is handed out at most once.
#[derive(Debug, Default, Clone)]
pub struct RoutePool {
    routes: Vec<Path>,
}

impl RoutePool {
    pub fn push(&mut self, route: Path) {
        self.routes.push(route);
    }

    pub fn get(&self, index: usize) -> Option<&Path> {
        self.routes.get(index)
    }

    /// Removes the route at `index`. The last route takes its place.
    pub fn take(&mut self, index: usize) -> Option<Path> {
        (index < self.routes.len()).then(|| self.routes.swap_remove(index))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl FromIterator<Path> for RoutePool {
    fn from_iter<T: IntoIterator<Item = Path>>(iter: T) -> Self {
        RoutePool {
            routes: iter.into_iter().collect(),
        }
    }
}
