use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

// ---------------------------------------------------------------------------
// CellValue – a single raw cell from the source sheet
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value as it came out of the workbook / CSV / JSON.
/// Kept per row so the table can show every source column verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{v:.0}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Interpret the cell as an integer. Spreadsheets store every number as
    /// f64, so integral floats are accepted as well.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Float(v)
                if v.fract() == 0.0 && *v >= i64::MIN as f64 && *v < i64::MAX as f64 =>
            {
                Some(*v as i64)
            }
            CellValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Interpret the cell as a calendar date; datetimes are truncated.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            CellValue::DateTime(dt) => Some(dt.date()),
            CellValue::String(s) => parse_date(s),
            _ => None,
        }
    }

    /// Non-empty text content, if any.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::String(s) if s.trim().is_empty() => None,
            other => Some(other.to_string()),
        }
    }
}

/// Parse an ISO date, accepting an optional time component.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

// ---------------------------------------------------------------------------
// Typed columns
// ---------------------------------------------------------------------------

/// Posting language. Source data encodes this as 1 / 2; anything else is
/// neither and maps to `None` on the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Language {
    English,
    Bangla,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::English, Language::Bangla];

    /// Map a raw `JobLang` code to a language.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Language::English),
            2 => Some(Language::Bangla),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Language::English => "English Job",
            Language::Bangla => "Bangla Job",
        }
    }
}

/// Opaque CP identifier. Integral cells become `Integer`, everything else
/// is kept as text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CpId {
    Integer(i64),
    Text(String),
}

impl CpId {
    pub fn from_cell(cell: &CellValue) -> Option<Self> {
        match cell {
            CellValue::Null => None,
            CellValue::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    None
                } else {
                    Some(CpId::Text(s.to_string()))
                }
            }
            other => match other.as_i64() {
                Some(i) => Some(CpId::Integer(i)),
                None => other.as_text().map(CpId::Text),
            },
        }
    }
}

impl From<&str> for CpId {
    fn from(s: &str) -> Self {
        CpId::Text(s.to_string())
    }
}

impl From<i64> for CpId {
    fn from(i: i64) -> Self {
        CpId::Integer(i)
    }
}

impl fmt::Display for CpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CpId::Integer(i) => write!(f, "{i}"),
            CpId::Text(s) => write!(f, "{s}"),
        }
    }
}

// ---------------------------------------------------------------------------
// JobRow – one posting
// ---------------------------------------------------------------------------

/// A single job posting (one row of the source sheet).
///
/// Typed fields are `None` when the source cell was missing or could not be
/// coerced; such rows simply fail the predicates that look at that field.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRow {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub publish_date: Option<NaiveDate>,
    pub cp_id: Option<CpId>,
    pub regional_job: Option<i64>,
    pub category_name: Option<String>,
    pub language: Option<Language>,
    /// Raw cells in source column order, for display.
    pub cells: Vec<CellValue>,
}

// ---------------------------------------------------------------------------
// JobDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset. Never mutated once built.
#[derive(Debug, Clone, Default)]
pub struct JobDataset {
    /// All postings, in source order.
    pub rows: Vec<JobRow>,
    /// Source column names, in sheet order.
    pub column_names: Vec<String>,
}

impl JobDataset {
    pub fn new(column_names: Vec<String>, rows: Vec<JobRow>) -> Self {
        JobDataset { rows, column_names }
    }

    /// Number of postings.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Earliest and latest publish date, ignoring rows without one.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        min_max(self.rows.iter().filter_map(|r| r.publish_date))
    }

    /// Smallest and largest `RegionalJob` value.
    pub fn regional_job_bounds(&self) -> Option<(i64, i64)> {
        min_max(self.rows.iter().filter_map(|r| r.regional_job))
    }

    /// Sorted distinct CP ids.
    pub fn distinct_cp_ids(&self) -> BTreeSet<CpId> {
        self.rows.iter().filter_map(|r| r.cp_id.clone()).collect()
    }

    /// Sorted distinct category names.
    pub fn distinct_categories(&self) -> BTreeSet<String> {
        self.rows
            .iter()
            .filter_map(|r| r.category_name.clone())
            .collect()
    }
}

fn min_max<T: Ord + Copy>(mut it: impl Iterator<Item = T>) -> Option<(T, T)> {
    let first = it.next()?;
    Some(it.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: Option<&str>, regional: Option<i64>, cp: Option<CpId>, cat: Option<&str>) -> JobRow {
        JobRow {
            id: None,
            title: None,
            publish_date: date.and_then(parse_date),
            cp_id: cp,
            regional_job: regional,
            category_name: cat.map(str::to_string),
            language: None,
            cells: Vec::new(),
        }
    }

    #[test]
    fn bounds_skip_missing_values() {
        let ds = JobDataset::new(
            Vec::new(),
            vec![
                row(Some("2024-02-10"), Some(5), Some("CP2".into()), Some("Tech")),
                row(None, None, None, None),
                row(Some("2024-01-05"), Some(1), Some("CP1".into()), Some("Sales")),
                row(Some("2024-03-01"), Some(3), Some("CP1".into()), Some("Tech")),
            ],
        );

        let d = |s| parse_date(s).unwrap();
        assert_eq!(ds.date_bounds(), Some((d("2024-01-05"), d("2024-03-01"))));
        assert_eq!(ds.regional_job_bounds(), Some((1, 5)));
        assert_eq!(
            ds.distinct_cp_ids().into_iter().collect::<Vec<_>>(),
            vec![CpId::from("CP1"), CpId::from("CP2")]
        );
        assert_eq!(
            ds.distinct_categories().into_iter().collect::<Vec<_>>(),
            vec!["Sales".to_string(), "Tech".to_string()]
        );
    }

    #[test]
    fn empty_dataset_has_no_bounds() {
        let ds = JobDataset::default();
        assert!(ds.is_empty());
        assert_eq!(ds.date_bounds(), None);
        assert_eq!(ds.regional_job_bounds(), None);
        assert!(ds.distinct_cp_ids().is_empty());
    }

    #[test]
    fn parse_date_accepts_time_suffix() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 20);
        assert_eq!(parse_date("2024-01-20"), expected);
        assert_eq!(parse_date(" 2024-01-20 09:30:00 "), expected);
        assert_eq!(parse_date("2024-01-20T09:30:00"), expected);
        assert_eq!(parse_date("20/01/2024"), None);
    }

    #[test]
    fn cells_coerce_to_integers() {
        assert_eq!(CellValue::Float(3.0).as_i64(), Some(3));
        assert_eq!(CellValue::Float(3.5).as_i64(), None);
        assert_eq!(CellValue::String(" 42 ".into()).as_i64(), Some(42));
        assert_eq!(CellValue::Null.as_i64(), None);
    }

    #[test]
    fn out_of_range_floats_are_not_integers() {
        assert_eq!(CellValue::Float(1e20).as_i64(), None);
        assert_eq!(CellValue::Float(-1e20).as_i64(), None);
        assert_eq!(CellValue::Float(f64::INFINITY).as_i64(), None);
        assert_eq!(CellValue::Float(f64::NAN).as_i64(), None);
        assert_eq!(CellValue::Float(-7.0).as_i64(), Some(-7));
    }

    #[test]
    fn cp_id_keeps_integral_cells_numeric() {
        assert_eq!(CpId::from_cell(&CellValue::Float(17.0)), Some(CpId::Integer(17)));
        assert_eq!(CpId::from_cell(&CellValue::String("CP1".into())), Some(CpId::from("CP1")));
        assert_eq!(CpId::from_cell(&CellValue::String("  ".into())), None);
        assert_eq!(CpId::from_cell(&CellValue::Null), None);
    }

    #[test]
    fn language_codes() {
        assert_eq!(Language::from_code(1), Some(Language::English));
        assert_eq!(Language::from_code(2), Some(Language::Bangla));
        assert_eq!(Language::from_code(0), None);
    }
}
