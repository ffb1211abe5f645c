//! Constants for the fetch module (timeouts, paging defaults).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout between body chunks (5 minutes).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Default number of records requested per page.
pub const DEFAULT_PAGE_SIZE: u64 = 500;

/// CDC "United States COVID-19 Cases and Deaths by State over Time" CSV endpoint.
pub const CDC_CASES_URL: &str = "https://data.cdc.gov/resource/9mfq-cb36.csv";

/// Server-side sort keeping page boundaries stable across requests.
pub const DEFAULT_SORT_ORDER: &str = ":id";
