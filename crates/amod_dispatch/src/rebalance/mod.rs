pub mod legacy;
pub mod rebalancer;
pub mod route_pool;
