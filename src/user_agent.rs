//! Shared User-Agent strings for API and download HTTP clients.
//!
//! Single source for the project URL and UA format so API and file traffic
//! stay consistent and easy to update.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/library-exporter";

/// Default User-Agent for API requests (auth, listing, lookups).
#[must_use]
pub(crate) fn default_api_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("library-exporter/{version} (api-client; +{PROJECT_UA_URL})")
}

/// Default User-Agent for file downloads.
#[must_use]
pub(crate) fn default_download_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("library-exporter/{version} (personal-library-export; +{PROJECT_UA_URL})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_format_consistency() {
        let api_ua = default_api_user_agent();
        let download_ua = default_download_user_agent();
        assert!(api_ua.contains(PROJECT_UA_URL));
        assert!(download_ua.contains(PROJECT_UA_URL));
        for ua in [&api_ua, &download_ua] {
            assert_eq!(
                env!("CARGO_PKG_VERSION"),
                ua.strip_prefix("library-exporter/")
                    .and_then(|s| s.split(' ').next())
                    .expect("UA has version"),
                "UA must contain crate version: {ua}"
            );
        }
    }
}
