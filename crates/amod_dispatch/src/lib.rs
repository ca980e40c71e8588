pub mod composition;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod optimizer;
pub mod params;
pub mod rebalance;
pub mod request;
pub mod route_tables;
pub mod schedule;
pub mod selector;
pub mod statistics;
pub mod utils;
pub mod vehicle;
