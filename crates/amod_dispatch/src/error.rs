use amod_routing::network::LinkIdx;
use jiff::SignedDuration;
use thiserror::Error;

use crate::request::RequestIdx;

/// Internal consistency violations while mutating a schedule.
///
/// These are contract violations of the caller and abort the tick.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchedulingError {
    #[error("Request {0} is not unplanned")]
    RequestNotUnplanned(RequestIdx),
    #[error("Vehicle {vehicle} has no trailing stay task")]
    MissingTrailingStay { vehicle: String },
    #[error("Trailing stay task of vehicle {vehicle} is already completed")]
    CompletedTrailingStay { vehicle: String },
    #[error("Schedule of vehicle {vehicle} is already completed")]
    ScheduleCompleted { vehicle: String },
    #[error("Vehicle {vehicle} cannot divert onto link {link}")]
    InvalidDiversion { vehicle: String, link: LinkIdx },
}

#[derive(Error, Debug)]
pub enum OptimizerError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Optimizer did not answer within {0}")]
    Timeout(SignedDuration),

    #[error("Optimizer client is closed")]
    Closed,

    #[error("Failed to start optimizer runtime: {0}")]
    Io(#[from] std::io::Error),

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamsError {
    #[error("{0} must be greater than zero")]
    ZeroPeriod(&'static str),
    #[error("{0} must not be negative")]
    Negative(&'static str),
}
