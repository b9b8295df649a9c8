use std::time::Duration;

use clap::Parser;

use crate::data::loader::DataSource;

/// The live-job spreadsheet published by the data team.
pub const DEFAULT_SOURCE: &str = "https://raw.githubusercontent.com/meharaz2020/ex/master/livejob.xlsx";

/// Startup configuration. Every flag can also be set through the
/// environment; logging is controlled with `RUST_LOG`.
#[derive(Debug, Clone, Parser)]
#[command(version, about = "Browse and filter live job postings")]
pub struct Config {
    /// Spreadsheet URL or local .xlsx/.csv/.json path.
    #[arg(long, env = "LIVEJOB_SOURCE", default_value = DEFAULT_SOURCE)]
    pub source: DataSource,

    /// HTTP timeout for fetching the source, in seconds.
    #[arg(long, env = "LIVEJOB_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Rows per table page.
    #[arg(
        long,
        env = "LIVEJOB_PAGE_SIZE",
        default_value_t = 10,
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub page_size: u16,
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
