use std::collections::BTreeSet;

use chrono::NaiveDate;
use thiserror::Error;

use super::model::{CpId, JobDataset, JobRow, Language};

// ---------------------------------------------------------------------------
// Filter criteria: one field per facet
// ---------------------------------------------------------------------------

/// Inclusive `[start, end]` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds<T> {
    pub start: T,
    pub end: T,
}

impl<T: PartialOrd> Bounds<T> {
    pub fn new(start: T, end: T) -> Self {
        Bounds { start, end }
    }

    fn contains(&self, v: &T) -> bool {
        self.start <= *v && *v <= self.end
    }
}

/// The complete filter selection. Absent ranges and empty sets mean
/// "no constraint" for that facet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    /// Integer → exact `JP_ID` match, otherwise a title substring.
    pub text_or_id: String,
    pub date_range: Option<Bounds<NaiveDate>>,
    pub cp_ids: BTreeSet<CpId>,
    pub regional_job_range: Option<Bounds<i64>>,
    pub category_names: BTreeSet<String>,
    pub languages: BTreeSet<Language>,
}

impl FilterCriteria {
    /// Criteria matching the initial control state: ranges span the data,
    /// nothing selected, empty search box.
    pub fn defaults_for(dataset: &JobDataset) -> Self {
        FilterCriteria {
            date_range: dataset.date_bounds().map(|(lo, hi)| Bounds::new(lo, hi)),
            regional_job_range: dataset
                .regional_job_bounds()
                .map(|(lo, hi)| Bounds::new(lo, hi)),
            ..FilterCriteria::default()
        }
    }

    /// Reject crossed ranges before any row is looked at.
    pub fn validate(&self) -> Result<(), InvalidCriteriaError> {
        if let Some(r) = &self.date_range {
            if r.start > r.end {
                return Err(InvalidCriteriaError::DateRange {
                    start: r.start,
                    end: r.end,
                });
            }
        }
        if let Some(r) = &self.regional_job_range {
            if r.start > r.end {
                return Err(InvalidCriteriaError::RegionalJobRange {
                    min: r.start,
                    max: r.end,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidCriteriaError {
    #[error("invalid date range: start {start} is after end {end}")]
    DateRange { start: NaiveDate, end: NaiveDate },
    #[error("invalid regional job range: min {min} is greater than max {max}")]
    RegionalJobRange { min: i64, max: i64 },
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

enum TextMatch {
    Any,
    Id(i64),
    Title(String),
}

impl TextMatch {
    fn parse(text: &str) -> Self {
        if text.is_empty() {
            return TextMatch::Any;
        }
        match text.trim().parse::<i64>() {
            Ok(id) => TextMatch::Id(id),
            Err(_) => TextMatch::Title(text.to_lowercase()),
        }
    }

    fn matches(&self, row: &JobRow) -> bool {
        match self {
            TextMatch::Any => true,
            TextMatch::Id(id) => row.id == Some(*id),
            TextMatch::Title(needle) => row
                .title
                .as_ref()
                .is_some_and(|t| t.to_lowercase().contains(needle.as_str())),
        }
    }
}

fn matches_all(row: &JobRow, text: &TextMatch, c: &FilterCriteria) -> bool {
    if !text.matches(row) {
        return false;
    }
    if let Some(range) = &c.date_range {
        if !row.publish_date.is_some_and(|d| range.contains(&d)) {
            return false;
        }
    }
    if !c.cp_ids.is_empty() && !row.cp_id.as_ref().is_some_and(|id| c.cp_ids.contains(id)) {
        return false;
    }
    if let Some(range) = &c.regional_job_range {
        if !row.regional_job.is_some_and(|v| range.contains(&v)) {
            return false;
        }
    }
    if !c.category_names.is_empty()
        && !row
            .category_name
            .as_ref()
            .is_some_and(|n| c.category_names.contains(n))
    {
        return false;
    }
    if !c.languages.is_empty() && !row.language.is_some_and(|l| c.languages.contains(&l)) {
        return false;
    }
    true
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Return indices of postings that pass every active facet, in dataset order.
///
/// Facets combine with AND; the set-valued facets (`cp_ids`,
/// `category_names`, `languages`) are OR within themselves.
pub fn filtered_indices(
    dataset: &JobDataset,
    criteria: &FilterCriteria,
) -> Result<Vec<usize>, InvalidCriteriaError> {
    criteria.validate()?;
    let text = TextMatch::parse(&criteria.text_or_id);
    Ok(dataset
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| matches_all(row, &text, criteria))
        .map(|(i, _)| i)
        .collect())
}

/// Same as [`filtered_indices`] but yields the rows themselves.
pub fn apply<'a>(
    dataset: &'a JobDataset,
    criteria: &FilterCriteria,
) -> Result<Vec<&'a JobRow>, InvalidCriteriaError> {
    Ok(filtered_indices(dataset, criteria)?
        .into_iter()
        .map(|i| &dataset.rows[i])
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::parse_date;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn posting(
        id: i64,
        title: &str,
        published: &str,
        cp: &str,
        regional: i64,
        cat: &str,
        lang: Language,
    ) -> JobRow {
        JobRow {
            id: Some(id),
            title: Some(title.to_string()),
            publish_date: Some(date(published)),
            cp_id: Some(CpId::from(cp)),
            regional_job: Some(regional),
            category_name: Some(cat.to_string()),
            language: Some(lang),
            cells: Vec::new(),
        }
    }

    fn sample() -> JobDataset {
        use Language::*;
        JobDataset::new(
            Vec::new(),
            vec![
                posting(101, "Backend Dev", "2024-01-05", "CP1", 3, "Tech", English),
                posting(102, "Frontend Dev", "2024-02-10", "CP2", 5, "Tech", Bangla),
                posting(103, "Sales Lead", "2024-01-20", "CP1", 1, "Sales", English),
                posting(104, "Backend Lead", "2024-03-01", "CP3", 3, "Tech", English),
            ],
        )
    }

    fn ids(ds: &JobDataset, c: &FilterCriteria) -> Vec<i64> {
        apply(ds, c)
            .expect("criteria should be valid")
            .iter()
            .filter_map(|r| r.id)
            .collect()
    }

    #[test]
    fn numeric_text_matches_id_exactly() {
        let c = FilterCriteria {
            text_or_id: "101".into(),
            ..Default::default()
        };
        assert_eq!(ids(&sample(), &c), vec![101]);
    }

    #[test]
    fn numeric_text_is_trimmed() {
        let c = FilterCriteria {
            text_or_id: "  104 ".into(),
            ..Default::default()
        };
        assert_eq!(ids(&sample(), &c), vec![104]);
    }

    #[test]
    fn text_matches_title_case_insensitively() {
        let c = FilterCriteria {
            text_or_id: "backend".into(),
            ..Default::default()
        };
        assert_eq!(ids(&sample(), &c), vec![101, 104]);
    }

    #[test]
    fn date_range_is_inclusive() {
        let c = FilterCriteria {
            date_range: Some(Bounds::new(date("2024-01-01"), date("2024-01-31"))),
            ..Default::default()
        };
        assert_eq!(ids(&sample(), &c), vec![101, 103]);

        let edge = FilterCriteria {
            date_range: Some(Bounds::new(date("2024-02-10"), date("2024-03-01"))),
            ..Default::default()
        };
        assert_eq!(ids(&sample(), &edge), vec![102, 104]);
    }

    #[test]
    fn cp_id_and_language_combine_with_and() {
        let c = FilterCriteria {
            cp_ids: [CpId::from("CP1")].into(),
            languages: [Language::English].into(),
            ..Default::default()
        };
        assert_eq!(ids(&sample(), &c), vec![101, 103]);
    }

    #[test]
    fn regional_job_single_value_range() {
        let c = FilterCriteria {
            regional_job_range: Some(Bounds::new(1, 1)),
            ..Default::default()
        };
        assert_eq!(ids(&sample(), &c), vec![103]);
    }

    #[test]
    fn crossed_regional_range_is_rejected() {
        let c = FilterCriteria {
            regional_job_range: Some(Bounds::new(5, 1)),
            ..Default::default()
        };
        assert_eq!(
            apply(&sample(), &c),
            Err(InvalidCriteriaError::RegionalJobRange { min: 5, max: 1 })
        );
    }

    #[test]
    fn crossed_date_range_is_rejected_even_on_empty_dataset() {
        let c = FilterCriteria {
            date_range: Some(Bounds::new(date("2024-02-01"), date("2024-01-01"))),
            ..Default::default()
        };
        assert!(matches!(
            filtered_indices(&JobDataset::default(), &c),
            Err(InvalidCriteriaError::DateRange { .. })
        ));
    }

    #[test]
    fn category_and_language() {
        let c = FilterCriteria {
            category_names: ["Tech".to_string()].into(),
            languages: [Language::Bangla].into(),
            ..Default::default()
        };
        assert_eq!(ids(&sample(), &c), vec![102]);
    }

    #[test]
    fn both_languages_are_ored() {
        let c = FilterCriteria {
            languages: [Language::English, Language::Bangla].into(),
            ..Default::default()
        };
        assert_eq!(ids(&sample(), &c), vec![101, 102, 103, 104]);
    }

    #[test]
    fn unconstrained_returns_everything_in_order() {
        let ds = sample();
        assert_eq!(ids(&ds, &FilterCriteria::default()), vec![101, 102, 103, 104]);
        assert_eq!(ids(&ds, &FilterCriteria::defaults_for(&ds)), vec![101, 102, 103, 104]);
    }

    #[test]
    fn repeated_evaluation_is_stable() {
        let ds = sample();
        let c = FilterCriteria {
            text_or_id: "dev".into(),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&ds, &c), filtered_indices(&ds, &c));
    }

    #[test]
    fn adding_a_facet_only_narrows() {
        let ds = sample();
        let base = FilterCriteria {
            category_names: ["Tech".to_string()].into(),
            ..Default::default()
        };
        let narrowed = FilterCriteria {
            cp_ids: [CpId::from("CP3"), CpId::from("CP2")].into(),
            ..base.clone()
        };
        let wide = filtered_indices(&ds, &base).unwrap();
        let narrow = filtered_indices(&ds, &narrowed).unwrap();
        assert!(narrow.iter().all(|i| wide.contains(i)));
        assert_eq!(narrow, vec![1, 3]);
    }

    #[test]
    fn missing_fields_exclude_only_under_their_facet() {
        let mut ds = sample();
        ds.rows.push(JobRow {
            id: Some(105),
            title: None,
            publish_date: None,
            cp_id: None,
            regional_job: None,
            category_name: None,
            language: None,
            cells: Vec::new(),
        });

        assert_eq!(ids(&ds, &FilterCriteria::default()).len(), 5);

        let by_text = FilterCriteria {
            text_or_id: "lead".into(),
            ..Default::default()
        };
        assert_eq!(ids(&ds, &by_text), vec![103, 104]);

        // Default bounds drop rows without a date or regional value.
        assert_eq!(ids(&ds, &FilterCriteria::defaults_for(&ds)), vec![101, 102, 103, 104]);
    }

    #[test]
    fn empty_dataset_yields_empty_result() {
        let ds = JobDataset::default();
        let defaults = FilterCriteria::defaults_for(&ds);
        assert_eq!(defaults.date_range, None);
        assert_eq!(defaults.regional_job_range, None);
        assert_eq!(apply(&ds, &defaults), Ok(Vec::new()));

        let by_text = FilterCriteria {
            text_or_id: "101".into(),
            ..FilterCriteria::defaults_for(&ds)
        };
        assert_eq!(apply(&ds, &by_text), Ok(Vec::new()));

        let by_title = FilterCriteria {
            text_or_id: "backend".into(),
            languages: [Language::English].into(),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&ds, &by_title), Ok(Vec::new()));
    }

    #[test]
    fn non_numeric_text_never_errors() {
        let c = FilterCriteria {
            text_or_id: "10x".into(),
            ..Default::default()
        };
        assert_eq!(ids(&sample(), &c), Vec::<i64>::new());
    }
}
