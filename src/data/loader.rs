use std::collections::BTreeMap;
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use serde_json::Value as JsonValue;

use super::model::{CellValue, CpId, JobDataset, JobRow, Language};

// ---------------------------------------------------------------------------
// Data source
// ---------------------------------------------------------------------------

/// Where the postings come from: a remote spreadsheet or a local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Url(String),
    File(PathBuf),
}

impl FromStr for DataSource {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let lower = s.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Ok(DataSource::Url(s.to_string()))
        } else {
            Ok(DataSource::File(PathBuf::from(s)))
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Url(u) => write!(f, "{u}"),
            DataSource::File(p) => write!(f, "{}", p.display()),
        }
    }
}

impl DataSource {
    /// Lower-cased file extension of the URL path or local path.
    fn extension(&self) -> Option<String> {
        let path = match self {
            DataSource::Url(u) => reqwest::Url::parse(u).ok()?.path().to_string(),
            DataSource::File(p) => p.to_string_lossy().into_owned(),
        };
        Path::new(&path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Fetch (or read) the source and parse it into a [`JobDataset`].
pub fn load_source(source: &DataSource, timeout: Duration) -> Result<JobDataset> {
    let bytes = match source {
        DataSource::Url(url) => fetch_bytes(url, timeout)?,
        DataSource::File(path) => std::fs::read(path)
            .with_context(|| format!("reading {}", path.display()))?,
    };
    log::debug!("read {} bytes from {source}", bytes.len());
    parse_bytes(&bytes, source.extension().as_deref())
        .with_context(|| format!("parsing postings from {source}"))
}

/// Download the raw spreadsheet bytes. Non-2xx statuses are errors.
pub fn fetch_bytes(url: &str, timeout: Duration) -> Result<Vec<u8>> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
        .context("building HTTP client")?;

    let response = client
        .get(url)
        .send()
        .with_context(|| format!("requesting {url}"))?
        .error_for_status()
        .with_context(|| format!("fetching {url}"))?;

    let bytes = response.bytes().context("reading response body")?;
    Ok(bytes.to_vec())
}

/// Parse raw bytes. `extension` picks the format; without one the bytes are
/// sniffed.
pub fn parse_bytes(bytes: &[u8], extension: Option<&str>) -> Result<JobDataset> {
    let table = match extension {
        Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => read_workbook(bytes)?,
        Some("csv") => read_csv(bytes)?,
        Some("json") => read_json(bytes)?,
        _ => match sniff(bytes) {
            Format::Workbook => read_workbook(bytes)?,
            Format::Json => read_json(bytes)?,
            Format::Csv => read_csv(bytes)?,
        },
    };
    table.into_dataset()
}

enum Format {
    Workbook,
    Json,
    Csv,
}

fn sniff(bytes: &[u8]) -> Format {
    const ZIP: &[u8] = b"PK\x03\x04";
    const OLE: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];
    if bytes.starts_with(ZIP) || bytes.starts_with(OLE) {
        return Format::Workbook;
    }
    match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'[') => Format::Json,
        _ => Format::Csv,
    }
}

// ---------------------------------------------------------------------------
// Raw table → typed postings
// ---------------------------------------------------------------------------

/// Header plus untyped cells, as read from any of the supported formats.
#[derive(Debug, Default)]
struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

const COL_ID: &str = "JP_ID";
const COL_TITLE: &str = "JobTitle";
const COL_PUBLISH_DATE: &str = "PublishDate";
const COL_CP_ID: &str = "CP_ID";
const COL_REGIONAL_JOB: &str = "RegionalJob";
const COL_CATEGORY: &str = "CAT_NAME";
const COL_LANGUAGE: &str = "JobLang";

impl RawTable {
    fn column(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("missing required column '{name}'"))
    }

    fn into_dataset(self) -> Result<JobDataset> {
        let id = self.column(COL_ID)?;
        let title = self.column(COL_TITLE)?;
        let publish_date = self.column(COL_PUBLISH_DATE)?;
        let cp_id = self.column(COL_CP_ID)?;
        let regional_job = self.column(COL_REGIONAL_JOB)?;
        let category = self.column(COL_CATEGORY)?;
        let language = self.column(COL_LANGUAGE)?;

        let rows = self
            .rows
            .into_iter()
            .map(|cells| {
                let cell = |i: usize| cells.get(i).unwrap_or(&CellValue::Null);
                JobRow {
                    id: cell(id).as_i64(),
                    title: cell(title).as_text(),
                    publish_date: cell(publish_date).as_date(),
                    cp_id: CpId::from_cell(cell(cp_id)),
                    regional_job: cell(regional_job).as_i64(),
                    category_name: cell(category).as_text(),
                    language: cell(language).as_i64().and_then(Language::from_code),
                    cells,
                }
            })
            .collect();

        Ok(JobDataset::new(self.headers, rows))
    }
}

// ---------------------------------------------------------------------------
// Workbook reader
// ---------------------------------------------------------------------------

/// First worksheet; first row is the header.
fn read_workbook(bytes: &[u8]) -> Result<RawTable> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).context("opening workbook")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("workbook has no worksheets")?
        .context("reading first worksheet")?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        bail!("worksheet is empty");
    };
    let headers = header_row
        .iter()
        .map(|c| workbook_cell(c).to_string().trim().to_string())
        .collect();

    let rows = rows
        .filter(|r| r.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|r| r.iter().map(workbook_cell).collect())
        .collect();

    Ok(RawTable { headers, rows })
}

fn workbook_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(v) => CellValue::Integer(*v),
        Data::Float(v) => CellValue::Float(*v),
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => dt.as_datetime().map_or(CellValue::Null, datetime_cell),
        Data::DateTimeIso(s) => guess_cell_type(s),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => {
            log::debug!("cell error {e:?} treated as empty");
            CellValue::Null
        }
        Data::Empty => CellValue::Null,
    }
}

/// Midnight timestamps are plain dates.
fn datetime_cell(ndt: chrono::NaiveDateTime) -> CellValue {
    if ndt.time() == chrono::NaiveTime::MIN {
        CellValue::Date(ndt.date())
    } else {
        CellValue::DateTime(ndt)
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

fn read_csv(bytes: &[u8]) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(guess_cell_type).collect());
    }

    Ok(RawTable { headers, rows })
}

fn guess_cell_type(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    if let Ok(d) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return CellValue::Date(d);
    }
    if let Some(dt) = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| chrono::NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return CellValue::DateTime(dt);
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, i.e. `df.to_json(orient='records')`:
///
/// ```json
/// [
///   { "JP_ID": 101, "JobTitle": "Backend Dev", "PublishDate": 1704412800000, ... },
///   ...
/// ]
/// ```
///
/// `PublishDate` may be an ISO string or integer epoch milliseconds (the
/// pandas default `date_unit`).
fn read_json(bytes: &[u8]) -> Result<RawTable> {
    let root: JsonValue = serde_json::from_slice(bytes).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut objects = Vec::with_capacity(records.len());
    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let rows = objects
        .into_iter()
        .map(|obj| {
            let by_name: BTreeMap<&str, CellValue> = obj
                .iter()
                .map(|(k, v)| {
                    let cell = match (k.as_str(), v.as_i64()) {
                        (COL_PUBLISH_DATE, Some(ms)) => epoch_millis_cell(ms),
                        _ => json_cell(v),
                    };
                    (k.as_str(), cell)
                })
                .collect();
            headers
                .iter()
                .map(|h| by_name.get(h.as_str()).cloned().unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    Ok(RawTable { headers, rows })
}

fn epoch_millis_cell(ms: i64) -> CellValue {
    match chrono::DateTime::from_timestamp_millis(ms) {
        Some(dt) => datetime_cell(dt.naive_utc()),
        None => CellValue::Integer(ms),
    }
}

fn json_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => guess_cell_type(s),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}
