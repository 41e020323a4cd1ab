//! Domain errors for the pure dashboard computations

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DashboardError {
    #[error("start year {start} is after end year {end}")]
    InvalidRange { start: i32, end: i32 },

    #[error("unknown variant '{0}'")]
    UnknownVariant(String),

    #[error("checklist has no item #{0}")]
    UnknownChecklistItem(usize),

    #[error("series has no points")]
    EmptySeries,

    #[error("parse error: {0}")]
    Parse(String),
}
