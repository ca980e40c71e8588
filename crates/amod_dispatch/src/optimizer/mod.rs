pub mod fleet_optimizer;
pub mod http_client;
pub mod input;
pub mod optimizer_client;
pub mod output;
pub mod recorded;
