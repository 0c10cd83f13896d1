use crate::constants;
use crate::error::AppError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// A `YYYYMM` period identifier.
///
/// The API sends it as a number in the season list and as a string in
/// season details; both forms deserialize into the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeasonId(u32);

impl SeasonId {
    /// Parses a six digit `YYYYMM` string. No calendar validation is done
    /// beyond the numeric shape.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let trimmed = raw.trim();
        if trimmed.len() != 6 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AppError::invalid_season_id(raw));
        }
        trimmed
            .parse::<u32>()
            .map(SeasonId)
            .map_err(|_| AppError::invalid_season_id(raw))
    }

    /// Builds an id from its numeric form, e.g. `202504`.
    pub fn from_number(value: u32) -> Result<Self, AppError> {
        if (100_000..=999_999).contains(&value) {
            Ok(SeasonId(value))
        } else {
            Err(AppError::invalid_season_id(value.to_string()))
        }
    }

    pub fn from_year_month(year: i32, month: u32) -> Result<Self, AppError> {
        let year = u32::try_from(year).map_err(|_| AppError::invalid_season_id(year.to_string()))?;
        Self::from_number(year * 100 + month)
    }

    pub fn as_number(&self) -> u32 {
        self.0
    }

    pub fn year(&self) -> i32 {
        (self.0 / 100) as i32
    }

    pub fn month(&self) -> u32 {
        self.0 % 100
    }

    /// Display name such as `2025年4月`.
    pub fn display_name(&self) -> String {
        format!("{}年{}月", self.year(), self.month())
    }
}

impl fmt::Display for SeasonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06}", self.0)
    }
}

impl std::str::FromStr for SeasonId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SeasonId::parse(s)
    }
}

impl Serialize for SeasonId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SeasonId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u32),
            Text(String),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Number(n) => SeasonId::from_number(n).map_err(serde::de::Error::custom),
            RawId::Text(s) => SeasonId::parse(&s).map_err(serde::de::Error::custom),
        }
    }
}

/// A quarterly period, derived purely from its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub season_id: SeasonId,
    pub name: String,
    pub year: i32,
    pub month: u32,
}

impl Season {
    pub fn from_id(season_id: SeasonId) -> Self {
        Season {
            season_id,
            name: season_id.display_name(),
            year: season_id.year(),
            month: season_id.month(),
        }
    }
}

/// Season list exactly as returned by `/api/v0/season/available`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAvailableSeasons {
    pub current_season_id: u32,
    pub available_seasons: Vec<u32>,
}

/// Season list converted into display-ready seasons, newest first as sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailableSeasons {
    pub current_season_id: u32,
    pub seasons: Vec<Season>,
}

impl TryFrom<RawAvailableSeasons> for AvailableSeasons {
    type Error = AppError;

    fn try_from(raw: RawAvailableSeasons) -> Result<Self, Self::Error> {
        Ok(AvailableSeasons {
            current_season_id: raw.current_season_id,
            seasons: convert_season_ids_to_seasons(&raw.available_seasons)?,
        })
    }
}

impl AvailableSeasons {
    /// The first (newest) season in the list
    pub fn current_season(&self) -> Option<&Season> {
        self.seasons.first()
    }

    /// The id the API reports as current, falling back to the newest listed season
    pub fn current_season_id(&self) -> Option<SeasonId> {
        SeasonId::from_number(self.current_season_id)
            .ok()
            .or_else(|| self.current_season().map(|s| s.season_id))
    }

    pub fn contains(&self, season_id: SeasonId) -> bool {
        self.seasons.iter().any(|s| s.season_id == season_id)
    }

    pub fn season_ids(&self) -> Vec<SeasonId> {
        self.seasons.iter().map(|s| s.season_id).collect()
    }
}

/// Converts numeric ids into seasons, preserving order.
pub fn convert_season_ids_to_seasons(season_ids: &[u32]) -> Result<Vec<Season>, AppError> {
    season_ids
        .iter()
        .map(|id| SeasonId::from_number(*id).map(Season::from_id))
        .collect()
}

/// Groups seasons by year; iterate `.iter().rev()` for newest years first.
pub fn group_seasons_by_year(seasons: &[Season]) -> BTreeMap<i32, Vec<Season>> {
    let mut groups: BTreeMap<i32, Vec<Season>> = BTreeMap::new();
    for season in seasons {
        groups.entry(season.year).or_default().push(season.clone());
    }
    groups
}

/// Enumerates quarterly season ids between two years, newest first.
pub fn generate_season_ids(first_year: i32, last_year: i32) -> Vec<SeasonId> {
    let mut ids = Vec::new();
    for year in (first_year..=last_year).rev() {
        for month in constants::season::QUARTER_MONTHS.iter().rev() {
            if let Ok(id) = SeasonId::from_year_month(year, *month) {
                ids.push(id);
            }
        }
    }
    ids
}

/// Season that contains the given calendar month.
pub fn season_for_month(year: i32, month: u32) -> Option<SeasonId> {
    let quarter_start = constants::season::QUARTER_MONTHS
        .iter()
        .rev()
        .find(|m| **m <= month)
        .copied()?;
    SeasonId::from_year_month(year, quarter_start).ok()
}
