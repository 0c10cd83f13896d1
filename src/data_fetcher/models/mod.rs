pub mod season;
pub mod subject;

pub use season::{
    AvailableSeasons, RawAvailableSeasons, Season, SeasonId, convert_season_ids_to_seasons,
    generate_season_ids, group_seasons_by_year, season_for_month,
};
pub use subject::{SeasonDetail, Subject, SubjectImages, SubjectTitles};
