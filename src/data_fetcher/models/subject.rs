use super::season::SeasonId;
use crate::data_fetcher::processors::parse_api_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SubjectTitles {
    pub name: String,
    #[serde(default)]
    pub name_cn: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SubjectImages {
    #[serde(default)]
    pub images_grid: String,
    #[serde(default)]
    pub images_large: String,
}

/// A ranked anime entry as sent by the API. Never mutated locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: u64,
    #[serde(flatten)]
    pub titles: SubjectTitles,
    #[serde(flatten)]
    pub images: SubjectImages,
    /// 0 means unranked
    #[serde(default)]
    pub rank: u32,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub collection_total: f64,
    #[serde(default)]
    pub average_comment: f64,
    #[serde(default)]
    pub drop_rate: f64,
    #[serde(default)]
    pub air_weekday: Option<String>,
    #[serde(default)]
    pub meta_tags: Vec<String>,
    #[serde(default)]
    pub updated_at: String,
}

impl Subject {
    /// Chinese title when present, original title otherwise
    pub fn display_title(&self) -> &str {
        if self.titles.name_cn.trim().is_empty() {
            &self.titles.name
        } else {
            &self.titles.name_cn
        }
    }

    pub fn is_ranked(&self) -> bool {
        self.rank > 0
    }
}

/// Ranked subjects of one season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonDetail {
    pub season_id: SeasonId,
    #[serde(default)]
    pub updated_at: String,
    pub subjects: Vec<Subject>,
}

impl SeasonDetail {
    pub fn updated_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_api_timestamp(&self.updated_at)
    }

    pub fn ranked_count(&self) -> usize {
        self.subjects.iter().filter(|s| s.is_ranked()).count()
    }
}
