pub mod api;
pub mod cache;
pub mod models;
pub mod policy;
pub mod processors;
pub mod stream;

pub use api::{HealthReport, RankingApi};
pub use models::{AvailableSeasons, Season, SeasonDetail, SeasonId, Subject};
pub use policy::{ErrorClassification, ErrorKind, RetryPolicy};
pub use stream::{
    DataStream, FreshnessMonitor, LoadOutcome, RetryOutcome, SeasonDetailStream,
    SeasonListStream, StreamSnapshot,
};
