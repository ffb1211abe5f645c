//! User-Agent string sent with every page request.

/// Project URL for User-Agent identification (good citizenship; RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/covid-data/covid-data";

/// Default User-Agent for page requests (identifies the tool and version).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("covid-data/{version} (dataset-export-tool; +{PROJECT_UA_URL})")
}
