mod beam;
mod config;
mod error;
mod node;
mod point;
mod tree;

pub use config::{MapConfig, OccupancyParams, DEFAULT_LOG_ODDS};
pub use error::Error;
pub use point::Point3;
pub use tree::{OctoTree, Snapshot};
