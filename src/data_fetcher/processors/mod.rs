pub mod formatting;
pub mod sorting;
pub mod time_formatting;

pub use formatting::{format_drop_rate, format_number, format_rank, format_score};
pub use sorting::{SortDirection, SortField, SortState, sort_subjects};
pub use time_formatting::{format_date_time, format_date_time_in, parse_api_timestamp};
