//! CLI command implementations

mod config;
mod record;
mod select;

pub use config::{ConfigArgs, config};
pub use record::{RecordArgs, record};
pub use select::{SelectArgs, select};
