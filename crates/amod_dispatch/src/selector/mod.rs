pub mod route_selector;
pub mod select_first_route;
pub mod select_random_route;
pub mod select_route;
