use crate::data_fetcher::models::Subject;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Rank,
    Score,
    CollectionTotal,
    AverageComment,
    DropRate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Asc => "↑",
            SortDirection::Desc => "↓",
        }
    }
}

impl SortField {
    pub const ALL: [SortField; 5] = [
        SortField::Rank,
        SortField::Score,
        SortField::CollectionTotal,
        SortField::AverageComment,
        SortField::DropRate,
    ];

    /// Rank reads best ascending; for every other field higher is better.
    pub fn default_direction(self) -> SortDirection {
        match self {
            SortField::Rank => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortField::Rank => "排名",
            SortField::Score => "评分",
            SortField::CollectionTotal => "收藏",
            SortField::AverageComment => "吐槽",
            SortField::DropRate => "弃番率",
        }
    }

    /// Numeric sort key; unranked subjects count as +infinity.
    fn key(self, subject: &Subject) -> f64 {
        match self {
            SortField::Rank if subject.rank == 0 => f64::INFINITY,
            SortField::Rank => f64::from(subject.rank),
            SortField::Score => subject.score,
            SortField::CollectionTotal => subject.collection_total,
            SortField::AverageComment => subject.average_comment,
            SortField::DropRate => subject.drop_rate,
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortField::Rank => "rank",
            SortField::Score => "score",
            SortField::CollectionTotal => "collection",
            SortField::AverageComment => "comments",
            SortField::DropRate => "drop-rate",
        };
        f.write_str(name)
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rank" => Ok(SortField::Rank),
            "score" => Ok(SortField::Score),
            "collection" | "collection_total" => Ok(SortField::CollectionTotal),
            "comments" | "average_comment" => Ok(SortField::AverageComment),
            "drop-rate" | "drop_rate" => Ok(SortField::DropRate),
            other => Err(format!(
                "unknown sort field '{other}' (expected rank, score, collection, comments or drop-rate)"
            )),
        }
    }
}

/// Current ordering of a ranking view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        SortState::for_field(SortField::Rank)
    }
}

impl SortState {
    pub fn for_field(field: SortField) -> Self {
        SortState {
            field,
            direction: field.default_direction(),
        }
    }

    /// Selecting the active field flips direction; a new field starts at
    /// its default direction.
    pub fn toggle(&mut self, field: SortField) {
        if self.field == field {
            self.direction = self.direction.toggled();
        } else {
            *self = SortState::for_field(field);
        }
    }

    pub fn apply(&self, subjects: &[Subject]) -> Vec<Subject> {
        sort_subjects(subjects, self.field, self.direction)
    }

    pub fn describe(&self) -> String {
        format!("{}{}", self.field.label(), self.direction.arrow())
    }
}

/// Returns a sorted copy of `subjects`; the input is left untouched.
///
/// The sort is stable, so equal keys keep their API order.
pub fn sort_subjects(
    subjects: &[Subject],
    field: SortField,
    direction: SortDirection,
) -> Vec<Subject> {
    let mut sorted = subjects.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = field.key(a).total_cmp(&field.key(b));
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_fetcher::models::{SubjectImages, SubjectTitles};

    fn subject(id: u64, rank: u32, score: f64, collection_total: f64) -> Subject {
        Subject {
            id,
            titles: SubjectTitles {
                name: format!("Subject {id}"),
                name_cn: String::new(),
            },
            images: SubjectImages::default(),
            rank,
            score,
            collection_total,
            average_comment: 0.0,
            drop_rate: id as f64 / 100.0,
            air_weekday: None,
            meta_tags: vec![],
            updated_at: String::new(),
        }
    }

    fn ids(subjects: &[Subject]) -> Vec<u64> {
        subjects.iter().map(|s| s.id).collect()
    }

    #[test]
    fn test_unranked_sorts_last_ascending() {
        let subjects = vec![
            subject(1, 0, 7.0, 10.0),
            subject(2, 3, 6.0, 10.0),
            subject(3, 1, 8.0, 10.0),
            subject(4, 0, 5.0, 10.0),
            subject(5, 2, 7.5, 10.0),
        ];

        let sorted = sort_subjects(&subjects, SortField::Rank, SortDirection::Asc);
        assert_eq!(ids(&sorted), vec![3, 5, 2, 1, 4]);
        assert!(sorted[3..].iter().all(|s| s.rank == 0));
    }

    #[test]
    fn test_sort_does_not_mutate_input() {
        let subjects = vec![subject(1, 2, 7.0, 10.0), subject(2, 1, 8.0, 20.0)];
        let before = subjects.clone();

        let sorted = sort_subjects(&subjects, SortField::Score, SortDirection::Desc);

        assert_eq!(subjects, before);
        assert_eq!(sorted.len(), subjects.len());
        assert_eq!(ids(&sorted), vec![2, 1]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let subjects = vec![
            subject(1, 1, 7.0, 10.0),
            subject(2, 2, 7.0, 10.0),
            subject(3, 3, 7.0, 10.0),
        ];
        let sorted = sort_subjects(&subjects, SortField::CollectionTotal, SortDirection::Desc);
        assert_eq!(ids(&sorted), vec![1, 2, 3]);
    }

    #[test]
    fn test_sort_by_each_field() {
        let subjects = vec![subject(1, 2, 6.0, 300.0), subject(2, 1, 9.0, 100.0)];

        assert_eq!(
            ids(&sort_subjects(&subjects, SortField::CollectionTotal, SortDirection::Asc)),
            vec![2, 1]
        );
        assert_eq!(
            ids(&sort_subjects(&subjects, SortField::DropRate, SortDirection::Desc)),
            vec![2, 1]
        );
        assert_eq!(
            ids(&sort_subjects(&subjects, SortField::Score, SortDirection::Asc)),
            vec![1, 2]
        );
    }

    #[test]
    fn test_toggle_same_field_flips_direction() {
        let mut state = SortState::default();
        assert_eq!(state, SortState::for_field(SortField::Rank));
        assert_eq!(state.direction, SortDirection::Asc);

        state.toggle(SortField::Rank);
        assert_eq!(state.direction, SortDirection::Desc);
        state.toggle(SortField::Rank);
        assert_eq!(state.direction, SortDirection::Asc);
    }

    #[test]
    fn test_toggle_new_field_uses_default_direction() {
        let mut state = SortState::default();
        state.toggle(SortField::Score);
        assert_eq!(state.field, SortField::Score);
        assert_eq!(state.direction, SortDirection::Desc);

        state.toggle(SortField::Score);
        state.toggle(SortField::Rank);
        assert_eq!(state.direction, SortDirection::Asc);
    }

    #[test]
    fn test_sort_field_parsing() {
        assert_eq!("drop-rate".parse::<SortField>(), Ok(SortField::DropRate));
        assert_eq!("Collection".parse::<SortField>(), Ok(SortField::CollectionTotal));
        assert!("popularity".parse::<SortField>().is_err());
        for field in SortField::ALL {
            assert_eq!(field.to_string().parse::<SortField>(), Ok(field));
        }
    }
}
