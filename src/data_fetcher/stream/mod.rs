//! Observable fetch state machines for the season list and season details.

mod core;
pub mod monitor;
pub mod source;
pub mod state;

pub use core::{DataStream, SeasonDetailStream, SeasonListStream};
pub use monitor::FreshnessMonitor;
pub use source::{SeasonDetailSource, SeasonListSource, StreamSource};
pub use state::{FetchState, LoadOutcome, RetryOutcome, StreamPhase, StreamSnapshot};
