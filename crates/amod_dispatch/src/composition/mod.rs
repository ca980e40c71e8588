pub mod loop_repair;
pub mod route_composer;
